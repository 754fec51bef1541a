use crate::{
    Error, Result,
    model::{Attribution, Outcome, Record},
};
use serde::{Deserialize, Serialize};

/// Bounds and defaults of one applicant input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub form_label: &'static str,
    pub min: f64,
    pub default: f64,
    pub step: f64,
}

pub const LOAN_AMOUNT: FieldSpec = FieldSpec {
    name: "loan_amnt",
    label: "Loan Amount",
    form_label: "Loan Amount",
    min: 1000.0,
    default: 10000.0,
    step: 500.0,
};

pub const ANNUAL_INCOME: FieldSpec = FieldSpec {
    name: "annual_inc",
    label: "Annual Income",
    form_label: "Annual Income",
    min: 1000.0,
    default: 50000.0,
    step: 1000.0,
};

pub const DEBT_TO_INCOME: FieldSpec = FieldSpec {
    name: "dti",
    label: "DTI",
    form_label: "DTI (Debt-to-Income Ratio)",
    min: 0.0,
    default: 15.0,
    step: 0.1,
};

pub const FIELDS: [FieldSpec; 3] = [LOAN_AMOUNT, ANNUAL_INCOME, DEBT_TO_INCOME];

impl FieldSpec {
    pub fn check(&self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::invalid_input(self.name, "must be a finite number"));
        }
        if value < self.min {
            return Err(Error::invalid_input(
                self.name,
                format!("must be at least {}", self.min),
            ));
        }
        Ok(())
    }

    /// Display label for a column name, falling back to the name itself.
    pub fn label_for(column: &str) -> String {
        FIELDS
            .iter()
            .find(|f| f.name == column)
            .map(|f| f.label.to_string())
            .unwrap_or_else(|| column.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub loan_amnt: f64,
    pub annual_inc: f64,
    pub dti: f64,
}

impl Default for ScoringRequest {
    fn default() -> Self {
        Self {
            loan_amnt: LOAN_AMOUNT.default,
            annual_inc: ANNUAL_INCOME.default,
            dti: DEBT_TO_INCOME.default,
        }
    }
}

impl ScoringRequest {
    pub fn new(loan_amnt: f64, annual_inc: f64, dti: f64) -> Self {
        Self {
            loan_amnt,
            annual_inc,
            dti,
        }
    }

    pub fn validate(&self) -> Result<()> {
        LOAN_AMOUNT.check(self.loan_amnt)?;
        ANNUAL_INCOME.check(self.annual_inc)?;
        DEBT_TO_INCOME.check(self.dti)?;
        Ok(())
    }

    /// Values paired with their field specs, in form order.
    pub fn values(&self) -> [(FieldSpec, f64); 3] {
        [
            (LOAN_AMOUNT, self.loan_amnt),
            (ANNUAL_INCOME, self.annual_inc),
            (DEBT_TO_INCOME, self.dti),
        ]
    }

    pub fn to_record(&self) -> Record {
        self.values()
            .into_iter()
            .fold(Record::new(), |record, (field, value)| {
                record.with(field.name, value)
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringResult {
    pub probability_fully_paid: f64,
    pub probability_default: f64,
    pub predicted_outcome: Outcome,
}

/// Everything one scoring action produces for the results area.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOutcome {
    pub request: ScoringRequest,
    pub result: ScoringResult,
    pub attribution: Option<Attribution>,
}
