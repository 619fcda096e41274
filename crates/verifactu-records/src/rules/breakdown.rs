//! Rules for individual tax breakdown lines.

use super::{matches_within, Validate, Violation};
use crate::breakdown::BreakdownDetails;

/// Absolute tolerance for `tax_amount` against `base * rate / 100`,
/// expressed as the accepted two-decimal offsets.
const TAX_AMOUNT_STEPS: &[f64] = &[0.0, -0.01, 0.01];

const BREAKDOWN_RULES: &[fn(&BreakdownDetails, &mut Vec<Violation>)] =
    &[rule_subject_fields, rule_tax_amount_tolerance];

fn rule_subject_fields(details: &BreakdownDetails, out: &mut Vec<Violation>) {
    if details.operation_type.is_subject() {
        if details.tax_rate.is_none() {
            out.push(Violation::new(
                "breakdown.rate-required",
                "tax_rate",
                "subject operations require a tax rate",
            ));
        }
        if details.tax_amount.is_none() {
            out.push(Violation::new(
                "breakdown.tax-amount-required",
                "tax_amount",
                "subject operations require a tax amount",
            ));
        }
    } else {
        if details.tax_rate.is_some() {
            out.push(Violation::new(
                "breakdown.rate-forbidden",
                "tax_rate",
                "not-subject and exempt operations cannot carry a tax rate",
            ));
        }
        if details.tax_amount.is_some() {
            out.push(Violation::new(
                "breakdown.tax-amount-forbidden",
                "tax_amount",
                "not-subject and exempt operations cannot carry a tax amount",
            ));
        }
    }
}

fn rule_tax_amount_tolerance(details: &BreakdownDetails, out: &mut Vec<Violation>) {
    let (Some(rate), Some(tax_amount)) = (&details.tax_rate, &details.tax_amount) else {
        return;
    };
    let expected = details.base_amount.value() * rate.value() / 100.0;
    if !matches_within(tax_amount.as_str(), expected, TAX_AMOUNT_STEPS) {
        out.push(Violation::numeric(
            "breakdown.tax-amount-tolerance",
            "tax_amount",
            "tax amount does not match base * rate / 100 within 0.01",
            format!("{expected:.2}"),
            tax_amount.as_str(),
        ));
    }
}

impl Validate for BreakdownDetails {
    fn check(&self, out: &mut Vec<Violation>) {
        for rule in BREAKDOWN_RULES {
            rule(self, out);
        }
    }
}
