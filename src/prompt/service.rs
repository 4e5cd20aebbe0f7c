//! Answer a free-text question with one of the series queries.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use crate::app::pipeline::CarbonService;
use crate::domain::time::month_name;
use crate::domain::{Concept, Interpretation, Statistic};
use crate::error::AppError;
use crate::prompt::Interpreter;

#[derive(Clone)]
pub struct PromptService {
    interpreter: Arc<dyn Interpreter>,
    service: CarbonService,
    series: String,
}

impl std::fmt::Debug for PromptService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptService").field("series", &self.series).finish_non_exhaustive()
    }
}

impl PromptService {
    pub fn new(interpreter: Arc<dyn Interpreter>, service: CarbonService, series: impl Into<String>) -> Self {
        Self {
            interpreter,
            service,
            series: series.into(),
        }
    }

    /// Interpret `prompt` and phrase the query result as a sentence.
    pub fn answer(&self, prompt: &str) -> Result<String, AppError> {
        let interpretation = self.interpreter.interpret(prompt)?;
        let last = self.service.last_available(&self.series)?;
        let concept = effective_concept(&interpretation, last);
        if concept != interpretation.concept {
            tracing::info!(
                requested = %interpretation.concept,
                end = %interpretation.end,
                last_available = %last,
                "range ends after available data, using seasonal prediction"
            );
        }

        let (start, end) = (interpretation.start.to_rfc3339(), interpretation.end.to_rfc3339());
        let period = describe_period(interpretation.start, interpretation.end);
        let stat = match concept {
            Concept::MaximumCarbonIntensity => Statistic::Max,
            Concept::MinimumCarbonIntensity => Statistic::Min,
            Concept::AverageCarbonIntensity => Statistic::Average,
            Concept::PredictLeastCarbon => {
                let p = self.service.predict_least_carbon(&self.series)?;
                return Ok(format!(
                    "Calling the function predict_least_carbon(id, start, end) will return {} Tons CO2e/GWh, \
                     for {} of the upcoming year.",
                    p.predicted_value,
                    month_name(p.month)
                ));
            }
        };

        let value = self.service.statistic(&self.series, stat, &start, &end)?;
        Ok(format!(
            "Calling the function {}(id, start, end) will return {} Tons CO2e/GWh, {period}.",
            function_name(stat),
            format_value(value)
        ))
    }
}

/// Ranges reaching past the data can only be answered by prediction.
pub fn effective_concept(interpretation: &Interpretation, last_available: DateTime<Utc>) -> Concept {
    if interpretation.end > last_available {
        Concept::PredictLeastCarbon
    } else {
        interpretation.concept
    }
}

fn function_name(stat: Statistic) -> &'static str {
    match stat {
        Statistic::Max => "get_max",
        Statistic::Min => "get_min",
        Statistic::Average => "get_avg",
        Statistic::Variance => "get_var",
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

fn describe_period(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let same_year = start.year() == end.year();
    if same_year && start.month() == end.month() {
        format!("in {} {}", month_name(start.month()), start.year())
    } else if same_year && start.month() == 1 && end.month() == 12 {
        format!("in {}", start.year())
    } else {
        format!(
            "between {} and {}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        )
    }
}
