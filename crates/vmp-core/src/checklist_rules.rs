// crates/vmp-core/src/checklist_rules.rs
// ============================================================================
// Module: Checklist Rules
// Description: Fixed, per-case-type checklist templates.
// Purpose: Give case creation one authoritative source for which steps a
//          new case of a given type starts with.
// Dependencies: (none; pure data)
// ============================================================================

//! ## Overview
//! Checklist rules are a compile-time-fixed table, not tenant-configurable
//! data. Creating a case of a given [`crate::domain::CaseType`] seeds its
//! checklist with exactly the steps this table names, in order. `general`,
//! `contract`, and `compliance` cases intentionally start with an empty
//! rule set: per the status-derivation rule, a case with no checklist steps
//! leaves its status untouched rather than auto-resolving, so those case
//! types are driven entirely by messages, evidence, and manual decisions.

/// One templated checklist step within a [`CaseType`](crate::domain::CaseType)'s rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecklistRuleStep {
    /// Stable key copied onto the instantiated [`crate::domain::ChecklistStep`].
    pub step_key: &'static str,
    /// Fixed ordering position, 0-based.
    pub sequence: u32,
    /// Human-readable label copied onto the instantiated step.
    pub label: &'static str,
    /// Whether the step requires at least one evidence row to complete.
    pub requires_evidence: bool,
}

const INVOICE_STEPS: &[ChecklistRuleStep] = &[
    ChecklistRuleStep {
        step_key: "collect_invoice_pdf",
        sequence: 0,
        label: "Collect invoice PDF",
        requires_evidence: true,
    },
    ChecklistRuleStep {
        step_key: "match_purchase_order",
        sequence: 1,
        label: "Match purchase order reference",
        requires_evidence: false,
    },
    ChecklistRuleStep {
        step_key: "match_goods_receipt",
        sequence: 2,
        label: "Match goods receipt note reference",
        requires_evidence: false,
    },
];

const PAYMENT_STEPS: &[ChecklistRuleStep] = &[ChecklistRuleStep {
    step_key: "collect_remittance_advice",
    sequence: 0,
    label: "Collect remittance advice",
    requires_evidence: true,
}];

const ONBOARDING_STEPS: &[ChecklistRuleStep] = &[
    ChecklistRuleStep {
        step_key: "collect_bank_letter",
        sequence: 0,
        label: "Collect bank letter",
        requires_evidence: true,
    },
    ChecklistRuleStep {
        step_key: "collect_tax_certificate",
        sequence: 1,
        label: "Collect tax certificate",
        requires_evidence: true,
    },
    ChecklistRuleStep {
        step_key: "collect_compliance_doc",
        sequence: 2,
        label: "Collect compliance document",
        requires_evidence: true,
    },
];

const BANK_CHANGE_STEPS: &[ChecklistRuleStep] = &[
    ChecklistRuleStep {
        step_key: "collect_bank_letter",
        sequence: 0,
        label: "Collect new bank letter",
        requires_evidence: true,
    },
    ChecklistRuleStep {
        step_key: "internal_approval",
        sequence: 1,
        label: "Obtain internal authorization",
        requires_evidence: false,
    },
];

/// Returns the fixed checklist template for `case_type`.
///
/// `General`, `Contract`, and `Compliance` cases return an empty slice by
/// design; see the module overview.
#[must_use]
pub fn rule_steps_for(case_type: crate::domain::CaseType) -> &'static [ChecklistRuleStep] {
    use crate::domain::CaseType;
    match case_type {
        CaseType::Invoice => INVOICE_STEPS,
        CaseType::Payment => PAYMENT_STEPS,
        CaseType::Onboarding => ONBOARDING_STEPS,
        CaseType::BankChange => BANK_CHANGE_STEPS,
        CaseType::General | CaseType::Contract | CaseType::Compliance => &[],
    }
}
