use super::{
    FormValues,
    charts::{self, ChartSpec},
    escape,
};
use crate::{
    Result,
    config::{ChartMode, DashboardConfig},
    scoring::ScoringOutcome,
};

/// What the results column shows. The trigger is the only transition:
/// `Idle` before any submission, then `Scored` or `Failed` for the last one.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardView {
    Idle,
    Scored(ScoringOutcome),
    Failed(String),
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f7f8fa; color: #1f2328; }
header, footer { padding: 1rem 2rem; }
footer { text-align: center; border-top: 1px solid #d0d7de; }
main { display: grid; grid-template-columns: 1fr 2fr; gap: 2.5rem; padding: 0 2rem 2rem; }
.inputs { display: flex; flex-direction: column; gap: 0.4rem; }
.inputs input { padding: 0.4rem; font-size: 1rem; }
.inputs button { margin-top: 0.8rem; padding: 0.6rem; font-size: 1rem; cursor: pointer; }
.metrics { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; }
.metric { padding: 1rem; border-radius: 6px; }
.metric .value { font-size: 2rem; font-weight: bold; }
.success { background: #dafbe1; color: #116329; }
.risk { background: #ffebe9; color: #a40e26; }
.error { background: #ffebe9; color: #a40e26; padding: 1rem; border-radius: 6px; }
.chart { margin-top: 1.5rem; }
"#;

/// Renders the whole dashboard page.
pub fn render_page(config: &DashboardConfig, form: &FormValues, view: &DashboardView) -> Result<String> {
    let results = match view {
        DashboardView::Idle => String::new(),
        DashboardView::Failed(message) => format!(
            r#"<div class="error" role="alert">Prediction failed: {}</div>"#,
            escape(message)
        ),
        DashboardView::Scored(outcome) => render_results(config.chart_mode, outcome)?,
    };

    let title = escape(&config.title);
    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<h1>{title}</h1>
<p>{subtitle}</p>
</header>
<main>
<section>
<h3>Loan Applicant Inputs</h3>
<p>Enter the details below:</p>
{form}
</section>
<section id="results">
{results}
</section>
</main>
<footer>{footer}</footer>
</body>
</html>
"#,
        subtitle = escape(&config.subtitle),
        form = form.render(),
        footer = escape(&config.footer),
    ))
}

fn render_results(mode: ChartMode, outcome: &ScoringOutcome) -> Result<String> {
    let result = &outcome.result;
    let feature_chart = match (mode, &outcome.attribution) {
        (ChartMode::Attribution, Some(attribution)) => charts::attribution_chart(attribution),
        _ => charts::feature_values_chart(&outcome.request),
    };

    let mut html = format!(
        r#"<h3>Prediction Results</h3>
<div class="metrics">
<div class="metric success"><div>Probability of Fully Paid</div><div class="value">{:.2}%</div></div>
<div class="metric risk"><div>Probability of Default</div><div class="value">{:.2}%</div></div>
</div>
<p class="verdict">Predicted outcome: <strong>{}</strong></p>
<h3>Visual Analytics</h3>
"#,
        result.probability_fully_paid, result.probability_default, result.predicted_outcome,
    );
    html.push_str(&chart_block(&feature_chart)?);
    html.push_str(&chart_block(&charts::probability_chart(result))?);
    Ok(html)
}

fn chart_block(spec: &ChartSpec) -> Result<String> {
    Ok(format!(
        r#"<figure class="chart"><figcaption>{}</figcaption>{}</figure>"#,
        escape(&spec.title),
        charts::render_svg(spec)?
    ))
}
