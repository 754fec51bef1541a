use super::escape;
use crate::{
    Error, Result,
    scoring::{FIELDS, FieldSpec, ScoringRequest},
};
use serde::Deserialize;

/// Raw form submission.
///
/// Fields arrive as text so a malformed number is reported back on the page
/// rather than rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormInput {
    #[serde(default)]
    pub loan_amnt: String,
    #[serde(default)]
    pub annual_inc: String,
    #[serde(default)]
    pub dti: String,
}

impl FormInput {
    fn raw(&self, field: &FieldSpec) -> &str {
        match field.name {
            "loan_amnt" => &self.loan_amnt,
            "annual_inc" => &self.annual_inc,
            _ => &self.dti,
        }
    }

    pub fn parse(&self) -> Result<ScoringRequest> {
        let [loan_amnt, annual_inc, dti] = FIELDS.map(|field| parse_field(&field, self.raw(&field)));
        let request = ScoringRequest::new(loan_amnt?, annual_inc?, dti?);
        request.validate()?;
        Ok(request)
    }
}

fn parse_field(field: &FieldSpec, raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid_input(field.name, "is required"));
    }
    raw.parse::<f64>()
        .map_err(|_| Error::invalid_input(field.name, format!("'{raw}' is not a number")))
}

/// Field values as shown in the inputs of the current render.
#[derive(Debug, Clone, PartialEq)]
pub struct FormValues {
    values: Vec<(FieldSpec, String)>,
}

impl Default for FormValues {
    fn default() -> Self {
        Self::from_request(&ScoringRequest::default())
    }
}

impl FormValues {
    pub fn from_request(request: &ScoringRequest) -> Self {
        Self {
            values: request
                .values()
                .into_iter()
                .map(|(field, value)| (field, value.to_string()))
                .collect(),
        }
    }

    /// Echoes back what the user typed, even when it failed to parse.
    pub fn from_input(input: &FormInput) -> Self {
        Self {
            values: FIELDS
                .iter()
                .map(|field| (*field, input.raw(field).trim().to_string()))
                .collect(),
        }
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(field, _)| field.name == name)
            .map(|(_, value)| value.as_str())
    }

    /// HTML for the three number inputs and the trigger button.
    pub fn render(&self) -> String {
        let mut html = String::from(r#"<form method="post" action="/predict" class="inputs">"#);
        for (field, value) in &self.values {
            html.push_str(&format!(
                r#"<label for="{name}">{label}</label><input type="number" id="{name}" name="{name}" min="{min}" step="{step}" value="{value}" required>"#,
                name = field.name,
                label = escape(field.form_label),
                min = field.min,
                step = field.step,
                value = escape(value),
            ));
        }
        html.push_str(r#"<button type="submit">Predict</button></form>"#);
        html
    }
}
