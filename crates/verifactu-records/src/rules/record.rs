//! Rules for the shared record envelope and the two record kinds.

use super::{is_blank, matches_within, Validate, Violation};
use crate::codes::{Correction, CorrectiveType, InvoiceType, PriorRejection};
use crate::records::{CancellationRecord, Record, RecordCommon, RegistrationRecord};

/// Accepted two-decimal offsets for the invoice total against the sum of
/// bases and taxes.
const TOTAL_AMOUNT_STEPS: &[f64] = &[0.0, -0.01, 0.01, -0.02, 0.02];

const COMMON_RULES: &[fn(&RecordCommon, &mut Vec<Violation>)] = &[
    rule_invoice_id,
    rule_issuer_name,
    rule_link_pairing,
    rule_flag_consistency,
    rule_external_reference,
];

fn rule_invoice_id(common: &RecordCommon, out: &mut Vec<Violation>) {
    common.invoice_id.check(out);
    if let Some(previous) = &common.previous_invoice_id {
        previous.check(out);
    }
}

fn rule_issuer_name(common: &RecordCommon, out: &mut Vec<Violation>) {
    if is_blank(&common.issuer_name) {
        out.push(Violation::new(
            "record.issuer-name",
            "issuer_name",
            "must not be blank",
        ));
    } else if common.issuer_name.chars().count() > 120 {
        out.push(Violation::new(
            "record.issuer-name",
            "issuer_name",
            "must not exceed 120 characters",
        ));
    }
}

fn rule_link_pairing(common: &RecordCommon, out: &mut Vec<Violation>) {
    if common.previous_invoice_id.is_some() != common.previous_hash.is_some() {
        out.push(Violation::spanning(
            "record.chain-link-pairing",
            &["previous_invoice_id", "previous_hash"],
            "previous invoice identifier and previous hash must be provided together",
        ));
    }
}

fn rule_flag_consistency(common: &RecordCommon, out: &mut Vec<Violation>) {
    if common.prior_rejection == Some(PriorRejection::BeforeSubmission)
        && common.correction != Some(Correction::Yes)
    {
        out.push(Violation::spanning(
            "record.rejection-requires-correction",
            &["prior_rejection", "correction"],
            "a prior rejection of \"X\" is only valid alongside a correction marker",
        ));
    }
    if common.correction == Some(Correction::No)
        && matches!(
            common.prior_rejection,
            Some(PriorRejection::ByAuthority) | Some(PriorRejection::BeforeSubmission)
        )
    {
        out.push(Violation::spanning(
            "record.no-correction-with-rejection",
            &["correction", "prior_rejection"],
            "an explicit no-correction marker cannot coexist with a prior rejection",
        ));
    }
    if common.correction == Some(Correction::Yes)
        && common.prior_rejection == Some(PriorRejection::No)
    {
        out.push(Violation::spanning(
            "record.correction-without-rejection",
            &["correction", "prior_rejection"],
            "a correction marker requires a prior rejection of \"S\" or \"X\"",
        ));
    }
}

fn rule_external_reference(common: &RecordCommon, out: &mut Vec<Violation>) {
    if let Some(reference) = &common.external_reference {
        if reference.chars().count() > 60 {
            out.push(Violation::new(
                "record.external-reference",
                "external_reference",
                "must not exceed 60 characters",
            ));
        }
    }
}

pub(crate) fn check_common(common: &RecordCommon, out: &mut Vec<Violation>) {
    for rule in COMMON_RULES {
        rule(common, out);
    }
}

const REGISTRATION_RULES: &[fn(&RegistrationRecord, &mut Vec<Violation>)] = &[
    rule_description,
    rule_breakdown,
    rule_totals,
    rule_recipients,
    rule_corrective_details,
    rule_replaced_invoices,
];

fn rule_description(record: &RegistrationRecord, out: &mut Vec<Violation>) {
    if is_blank(&record.description) {
        out.push(Violation::new(
            "registration.description",
            "description",
            "must not be blank",
        ));
    } else if record.description.chars().count() > 500 {
        out.push(Violation::new(
            "registration.description",
            "description",
            "must not exceed 500 characters",
        ));
    }
}

fn rule_breakdown(record: &RegistrationRecord, out: &mut Vec<Violation>) {
    if record.breakdown.is_empty() || record.breakdown.len() > 12 {
        out.push(Violation::new(
            "registration.breakdown-count",
            "breakdown",
            "must carry between 1 and 12 lines",
        ));
    }
    for details in &record.breakdown {
        details.check(out);
    }
}

fn rule_totals(record: &RegistrationRecord, out: &mut Vec<Violation>) {
    if record.breakdown.is_empty() {
        return;
    }
    let mut tax_sum = 0.0;
    let mut base_sum = 0.0;
    for details in &record.breakdown {
        // Totals over lines without a tax amount are not checkable.
        let Some(tax_amount) = &details.tax_amount else {
            return;
        };
        tax_sum += tax_amount.value();
        base_sum += details.base_amount.value();
    }

    let expected_tax = format!("{tax_sum:.2}");
    if record.total_tax_amount.as_str() != expected_tax {
        out.push(Violation::numeric(
            "registration.total-tax",
            "total_tax_amount",
            "total tax must exactly equal the sum of the breakdown tax amounts",
            expected_tax,
            record.total_tax_amount.as_str(),
        ));
    }

    let expected_total = base_sum + tax_sum;
    if !matches_within(record.total_amount.as_str(), expected_total, TOTAL_AMOUNT_STEPS) {
        out.push(Violation::numeric(
            "registration.total-amount",
            "total_amount",
            "total amount does not match the sum of bases and taxes within 0.02",
            format!("{expected_total:.2}"),
            record.total_amount.as_str(),
        ));
    }
}

fn rule_recipients(record: &RegistrationRecord, out: &mut Vec<Violation>) {
    if record.invoice_type.requires_recipients() {
        if record.recipients.is_empty() {
            out.push(Violation::new(
                "registration.recipients-required",
                "recipients",
                "this invoice type requires at least one recipient",
            ));
        }
    } else if !record.recipients.is_empty() {
        out.push(Violation::new(
            "registration.recipients-forbidden",
            "recipients",
            "this invoice type cannot carry recipients",
        ));
    }
    if record.recipients.len() > 1000 {
        out.push(Violation::new(
            "registration.recipients-count",
            "recipients",
            "must not exceed 1000 recipients",
        ));
    }
    for recipient in &record.recipients {
        recipient.check(out);
    }
}

fn rule_corrective_details(record: &RegistrationRecord, out: &mut Vec<Violation>) {
    let is_corrective = record.invoice_type.is_corrective();

    if is_corrective && record.corrective_type.is_none() {
        out.push(Violation::new(
            "registration.corrective-type-required",
            "corrective_type",
            "corrective invoices require a corrective method",
        ));
    }
    if !is_corrective && record.corrective_type.is_some() {
        out.push(Violation::new(
            "registration.corrective-type-forbidden",
            "corrective_type",
            "only corrective invoices can carry a corrective method",
        ));
    }
    if !is_corrective && !record.corrected_invoices.is_empty() {
        out.push(Violation::new(
            "registration.corrected-invoices-forbidden",
            "corrected_invoices",
            "only corrective invoices can reference corrected invoices",
        ));
    }

    if record.corrective_type == Some(CorrectiveType::Substitution) {
        if record.corrected_base_amount.is_none() {
            out.push(Violation::new(
                "registration.corrected-base-required",
                "corrected_base_amount",
                "correctives by substitution require the corrected base amount",
            ));
        }
        if record.corrected_tax_amount.is_none() {
            out.push(Violation::new(
                "registration.corrected-tax-required",
                "corrected_tax_amount",
                "correctives by substitution require the corrected tax amount",
            ));
        }
    } else {
        if record.corrected_base_amount.is_some() {
            out.push(Violation::new(
                "registration.corrected-base-forbidden",
                "corrected_base_amount",
                "only correctives by substitution can carry a corrected base amount",
            ));
        }
        if record.corrected_tax_amount.is_some() {
            out.push(Violation::new(
                "registration.corrected-tax-forbidden",
                "corrected_tax_amount",
                "only correctives by substitution can carry a corrected tax amount",
            ));
        }
    }
}

fn rule_replaced_invoices(record: &RegistrationRecord, out: &mut Vec<Violation>) {
    if record.invoice_type != InvoiceType::F3 && !record.replaced_invoices.is_empty() {
        out.push(Violation::new(
            "registration.replaced-invoices-forbidden",
            "replaced_invoices",
            "only substitutive invoices (F3) can reference replaced invoices",
        ));
    }
}

impl Validate for RegistrationRecord {
    fn check(&self, out: &mut Vec<Violation>) {
        check_common(&self.common, out);
        for rule in REGISTRATION_RULES {
            rule(self, out);
        }
    }
}

const CANCELLATION_RULES: &[fn(&CancellationRecord, &mut Vec<Violation>)] =
    &[rule_previous_link_required];

fn rule_previous_link_required(record: &CancellationRecord, out: &mut Vec<Violation>) {
    if record.common.previous_invoice_id.is_none() || record.common.previous_hash.is_none() {
        out.push(Violation::spanning(
            "cancellation.previous-link-required",
            &["previous_invoice_id", "previous_hash"],
            "a cancellation can never open a chain; the previous invoice identifier and hash are mandatory",
        ));
    }
}

impl Validate for CancellationRecord {
    fn check(&self, out: &mut Vec<Violation>) {
        check_common(&self.common, out);
        for rule in CANCELLATION_RULES {
            rule(self, out);
        }
    }
}

impl Validate for Record {
    fn check(&self, out: &mut Vec<Violation>) {
        match self {
            Record::Registration(record) => record.check(out),
            Record::Cancellation(record) => record.check(out),
        }
    }
}
