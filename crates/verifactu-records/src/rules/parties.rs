//! Field-level rules for identifiers and the software descriptor.

use regex::Regex;

use super::{is_blank, Validate, Violation};
use crate::identifiers::{FiscalId, ForeignFiscalId, InvoiceId, Recipient};
use crate::system::ComputerSystem;

fn check_text(
    out: &mut Vec<Violation>,
    rule: &'static str,
    field: &'static str,
    value: &str,
    max_len: usize,
) {
    if is_blank(value) {
        out.push(Violation::new(rule, field, "must not be blank"));
    } else if value.chars().count() > max_len {
        out.push(Violation::new(
            rule,
            field,
            format!("must not exceed {max_len} characters"),
        ));
    }
}

fn check_nif(out: &mut Vec<Violation>, rule: &'static str, field: &'static str, value: &str) {
    if is_blank(value) {
        out.push(Violation::new(rule, field, "must not be blank"));
    } else if value.chars().count() != 9 {
        out.push(Violation::new(rule, field, "must be exactly 9 characters"));
    }
}

const INVOICE_ID_RULES: &[fn(&InvoiceId, &mut Vec<Violation>)] =
    &[rule_invoice_issuer, rule_invoice_number];

fn rule_invoice_issuer(id: &InvoiceId, out: &mut Vec<Violation>) {
    check_nif(out, "invoice-id.issuer", "issuer_id", &id.issuer_id);
}

fn rule_invoice_number(id: &InvoiceId, out: &mut Vec<Violation>) {
    check_text(out, "invoice-id.number", "invoice_number", &id.invoice_number, 60);
}

impl Validate for InvoiceId {
    fn check(&self, out: &mut Vec<Violation>) {
        for rule in INVOICE_ID_RULES {
            rule(self, out);
        }
    }
}

const FISCAL_ID_RULES: &[fn(&FiscalId, &mut Vec<Violation>)] = &[rule_fiscal_name, rule_fiscal_nif];

fn rule_fiscal_name(id: &FiscalId, out: &mut Vec<Violation>) {
    check_text(out, "fiscal-id.name", "name", &id.name, 120);
}

fn rule_fiscal_nif(id: &FiscalId, out: &mut Vec<Violation>) {
    check_nif(out, "fiscal-id.nif", "nif", &id.nif);
}

impl Validate for FiscalId {
    fn check(&self, out: &mut Vec<Violation>) {
        for rule in FISCAL_ID_RULES {
            rule(self, out);
        }
    }
}

const FOREIGN_ID_RULES: &[fn(&ForeignFiscalId, &mut Vec<Violation>)] =
    &[rule_foreign_name, rule_foreign_country, rule_foreign_value];

fn rule_foreign_name(id: &ForeignFiscalId, out: &mut Vec<Violation>) {
    check_text(out, "foreign-id.name", "name", &id.name, 120);
}

fn rule_foreign_country(id: &ForeignFiscalId, out: &mut Vec<Violation>) {
    let re = Regex::new(r"^[A-Z]{2}$").expect("invalid regex");
    if !re.is_match(&id.country) {
        out.push(Violation::pattern("foreign-id.country", "country", &id.country));
    } else if id.country == "ES" {
        out.push(Violation::new(
            "foreign-id.country-not-domestic",
            "country",
            "country cannot be \"ES\"; use a domestic fiscal identity instead",
        ));
    }
}

fn rule_foreign_value(id: &ForeignFiscalId, out: &mut Vec<Violation>) {
    check_text(out, "foreign-id.value", "value", &id.value, 20);
}

impl Validate for ForeignFiscalId {
    fn check(&self, out: &mut Vec<Violation>) {
        for rule in FOREIGN_ID_RULES {
            rule(self, out);
        }
    }
}

impl Validate for Recipient {
    fn check(&self, out: &mut Vec<Violation>) {
        match self {
            Recipient::Domestic(id) => id.check(out),
            Recipient::Foreign(id) => id.check(out),
        }
    }
}

const SYSTEM_RULES: &[fn(&ComputerSystem, &mut Vec<Violation>)] = &[
    rule_system_vendor,
    rule_system_name,
    rule_system_id,
    rule_system_version,
    rule_system_installation,
];

fn rule_system_vendor(system: &ComputerSystem, out: &mut Vec<Violation>) {
    check_text(out, "system.vendor-name", "vendor_name", &system.vendor_name, 120);
    check_nif(out, "system.vendor-nif", "vendor_nif", &system.vendor_nif);
}

fn rule_system_name(system: &ComputerSystem, out: &mut Vec<Violation>) {
    check_text(out, "system.name", "name", &system.name, 30);
}

fn rule_system_id(system: &ComputerSystem, out: &mut Vec<Violation>) {
    let len = system.id.chars().count();
    if is_blank(&system.id) || len == 0 || len > 2 {
        out.push(Violation::new(
            "system.id",
            "id",
            "must be 1 or 2 characters and not blank",
        ));
    }
}

fn rule_system_version(system: &ComputerSystem, out: &mut Vec<Violation>) {
    check_text(out, "system.version", "version", &system.version, 50);
}

fn rule_system_installation(system: &ComputerSystem, out: &mut Vec<Violation>) {
    check_text(
        out,
        "system.installation-number",
        "installation_number",
        &system.installation_number,
        100,
    );
}

impl Validate for ComputerSystem {
    fn check(&self, out: &mut Vec<Violation>) {
        for rule in SYSTEM_RULES {
            rule(self, out);
        }
    }
}
