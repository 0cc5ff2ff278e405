//! Request dispatcher.

use crate::ruleset::Ruleset;
use crate::task::Task;
use crate::{analytics, controls, group, materiality, projection, risk, sampling};
use audit_types::{
    AnalyticsResult, AuditContext, DeficiencySeverity, EngineError, EngineRequest, EngineResponse,
    EngineResult, WorkEffort,
};
use serde::Serialize;
use tracing::{debug, info_span, warn};

pub const FIRST_YEAR_WARNING: &str =
    "First-year audit requires additional procedures over opening balances";

/// Stateless audit engine holding an immutable [`Ruleset`].
///
/// `Send + Sync`; share one instance freely across threads.
#[derive(Debug, Clone, Default)]
pub struct AuditEngine {
    ruleset: Ruleset,
}

/// Encoded result plus advisories, before wrapping in the envelope.
struct Outcome {
    data: serde_json::Value,
    warnings: Vec<String>,
    next_steps: Vec<String>,
}

impl Outcome {
    fn new<T: Serialize>(data: &T) -> EngineResult<Self> {
        let data = serde_json::to_value(data)
            .map_err(|err| EngineError::invalid(format!("result could not be encoded: {err}")))?;
        Ok(Self {
            data,
            warnings: Vec::new(),
            next_steps: Vec::new(),
        })
    }

    fn warn_if(mut self, condition: bool, warning: impl Into<String>) -> Self {
        if condition {
            self.warnings.push(warning.into());
        }
        self
    }

    fn steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.next_steps.extend(steps.into_iter().map(Into::into));
        self
    }
}

impl AuditEngine {
    /// Build an engine after checking the ruleset.
    pub fn new(ruleset: Ruleset) -> EngineResult<Self> {
        ruleset.validate()?;
        Ok(Self { ruleset })
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Handle one request. Never fails: errors become `success: false`.
    pub fn handle(&self, request: &EngineRequest) -> EngineResponse {
        let span = info_span!("audit_task", task = %request.task);
        let _entered = span.enter();

        let outcome = Task::from_request(&request.task, &request.parameters)
            .and_then(|task| self.execute(task, &request.context));

        match outcome {
            Ok(outcome) => {
                let mut response = EngineResponse::ok(outcome.data)
                    .with_warnings(outcome.warnings)
                    .with_next_steps(outcome.next_steps);
                if request.context.first_year_audit {
                    response.push_warning(FIRST_YEAR_WARNING);
                }
                debug!(warnings = response.warnings.len(), "task completed");
                response
            }
            Err(err) => {
                warn!(code = err.code(), error = %err, "task failed");
                EngineResponse::failure(&err)
            }
        }
    }

    /// Handle independent requests in order; one failure never stops the rest.
    pub fn handle_batch(&self, requests: &[EngineRequest]) -> Vec<EngineResponse> {
        requests.iter().map(|request| self.handle(request)).collect()
    }

    /// Run a decoded task.
    fn execute(&self, task: Task, context: &AuditContext) -> EngineResult<Outcome> {
        let rules = &self.ruleset;
        match task {
            Task::CalculateMateriality(params) => {
                let risk_level = params
                    .risk_level
                    .or_else(|| context.prior_inherent_risk())
                    .unwrap_or_default();
                let result = materiality::calculate_materiality(
                    &rules.materiality,
                    params.financial_data.as_ref(),
                    risk_level,
                )?;
                Ok(Outcome::new(&result)?
                    .warn_if(
                        context.group_audit,
                        "Group audit: allocate component materiality to significant components",
                    )
                    .warn_if(
                        context.listed_entity,
                        "Listed entity: consider lower materiality for public interest users",
                    )
                    .steps([
                        "Document materiality decisions in planning memorandum",
                        "Communicate performance materiality to audit team",
                        "Consider specific materiality for sensitive items",
                        "Reassess materiality if circumstances change",
                    ]))
            }
            Task::AssessAccountRisk(params) => {
                let result = risk::assess_account_risk(
                    &rules.risk,
                    &params.account,
                    &params.assertions,
                    &params.risk_factors,
                    &params.control_environment,
                )?;
                let significant = result.is_significant_risk;
                let mut outcome = Outcome::new(&result)?
                    .warn_if(
                        significant,
                        "Significant risk identified - requires substantive procedures regardless of controls",
                    )
                    .steps([
                        "Design audit procedures responsive to assessed risk",
                        "Document risk assessment rationale",
                    ]);
                if significant {
                    outcome = outcome.steps(["Communicate significant risk to engagement partner"]);
                }
                Ok(outcome)
            }
            Task::IdentifySignificantRisks => {
                Ok(Outcome::new(&risk::identify_significant_risks(context))?.steps([
                    "Document all significant risks in audit planning memorandum",
                    "Design substantive procedures for each significant risk",
                    "Discuss significant risks with those charged with governance",
                    "Update risk assessment if circumstances change during audit",
                ]))
            }
            Task::EvaluateFraudRisks => {
                Ok(Outcome::new(&risk::evaluate_fraud_risks(context))?.steps([
                    "Design fraud-specific audit procedures",
                    "Incorporate unpredictability element",
                    "Communicate with engagement partner",
                ]))
            }
            Task::CalculateSampleSize(params) => {
                let data = params.sampling_data.ok_or_else(|| {
                    EngineError::missing("sampling parameters required for sample size calculation")
                })?;
                let design = sampling::calculate_sample_size(&rules.sampling, &data)?;
                let full = design.full_population;
                let population = design.population_size;
                Ok(Outcome::new(&design)?
                    .warn_if(
                        full,
                        format!("Sample covers the entire population of {population} items; examine every item"),
                    )
                    .steps([
                        "Document sampling methodology in working papers",
                        "Apply selected sampling technique consistently",
                        "Investigate all identified deviations/misstatements",
                        "Evaluate results against tolerable misstatement",
                    ]))
            }
            Task::ProjectMisstatement(params) => {
                let (Some(data), Some(results)) = (params.sampling_data, params.sample_results)
                else {
                    return Err(EngineError::missing("sampling data and sample results required"));
                };
                let result = projection::project_misstatement(
                    &rules.projection,
                    &results,
                    data.population_value,
                    data.tolerable_misstatement,
                )?;
                let steps = result.recommendations.clone();
                Ok(Outcome::new(&result)?.steps(steps))
            }
            Task::BenfordAnalysis(population) => {
                let result = analytics::benford_analysis(&rules.analytics, &population.figures)?;
                let considered = result.values_considered;
                let min = rules.analytics.benford_min_reliable_population;
                let steps: &[&str] = if result.has_anomalies() {
                    &[
                        "Investigate transactions with anomalous leading digits",
                        "Extend journal entry testing to the affected population",
                    ]
                } else {
                    &["Document analytics results in working papers"]
                };
                Ok(Outcome::new(&AnalyticsResult::from(result))?
                    .warn_if(
                        considered < min,
                        format!("Only {considered} values considered; Benford analysis has limited reliability below {min} values"),
                    )
                    .steps(steps.iter().copied()))
            }
            Task::OutlierDetection(population) => {
                let result = analytics::outlier_detection(&rules.analytics, &population.figures)?;
                let steps: &[&str] = if result.outliers.is_empty() {
                    &["Document analytics results in working papers"]
                } else {
                    &[
                        "Obtain supporting evidence for each flagged value",
                        "Consider whether flagged values indicate error or fraud",
                    ]
                };
                Ok(Outcome::new(&AnalyticsResult::from(result))?.steps(steps.iter().copied()))
            }
            Task::TestOperatingEffectiveness(test) => {
                let result = controls::test_operating_effectiveness(&rules.controls, &test)?;
                let significant = result
                    .deficiency
                    .as_ref()
                    .is_some_and(|d| d.severity == DeficiencySeverity::SignificantDeficiency);
                let steps: &[&str] = if result.operating_effective {
                    &["Document reliance on control in audit plan"]
                } else {
                    &[
                        "Evaluate impact on planned substantive procedures",
                        "Communicate deficiency to management",
                    ]
                };
                Ok(Outcome::new(&result)?
                    .warn_if(
                        significant,
                        "Significant deficiency identified - communicate to those charged with governance",
                    )
                    .steps(steps.iter().copied()))
            }
            Task::ClassifyComponent(figures) => {
                let result = group::classify_component(&rules.group, &figures)?;
                let step = work_effort_step(result.work_effort);
                Ok(Outcome::new(&result)?.steps([step]))
            }
            Task::AllocateMateriality(params) => {
                let group_materiality = params
                    .group_materiality
                    .ok_or_else(|| EngineError::missing("group materiality required for allocation"))?;
                let result =
                    group::allocate_materiality(&rules.group, &params.figures, group_materiality)?;
                let step = work_effort_step(result.work_effort);
                Ok(Outcome::new(&result)?.steps([
                    step,
                    "Communicate component materiality to component auditors",
                ]))
            }
        }
    }
}

fn work_effort_step(effort: WorkEffort) -> &'static str {
    match effort {
        WorkEffort::FullAudit => "Plan a full audit of the component's financial information",
        WorkEffort::SpecifiedProcedures => "Plan specified procedures over the component's material balances",
        WorkEffort::AnalyticalOnly => "Perform analytical procedures at group level",
    }
}
