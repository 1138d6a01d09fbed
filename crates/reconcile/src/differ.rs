//! Desired-vs-actual diffing and the deletion denylist.

use crate::types::{Label, LabelChange, MutationPlan};

/// Label names removed on every run, independent of the desired set: the
/// legacy defaults the hosting platform seeds on new repositories plus the
/// CI-trigger labels the automation used to react to.
pub const DENYLIST: &[&str] = &[
    "bug",
    "enhancement",
    "ci:force-build",
    "ci: force-run",
    "ci: run",
    "question",
];

/// Compares the desired and actual label sets and emits the minimal mutation
/// plan.
///
/// Name matching is case-insensitive. A desired label with no match becomes a
/// `Create`; a match whose colour or description drifted becomes an `Update`
/// keyed by the actual label's current name; an exact match emits nothing.
///
/// The deletion pass is independent of the desired set: every actual label
/// whose name exactly matches a [`DENYLIST`] entry is scheduled for deletion,
/// even if it also matched a desired label above. Both actions then run.
pub fn diff(desired: &[Label], actual: &[Label]) -> MutationPlan {
    let mut plan = MutationPlan::default();

    for wanted in desired {
        let found = actual
            .iter()
            .find(|have| have.name.eq_ignore_ascii_case(&wanted.name));
        match found {
            None => plan.changes.push(LabelChange::Create(wanted.clone())),
            Some(have) if have.color != wanted.color || have.description != wanted.description => {
                plan.changes.push(LabelChange::Update {
                    current_name: have.name.clone(),
                    label: wanted.clone(),
                });
            }
            Some(_) => {}
        }
    }

    for have in actual {
        if DENYLIST.contains(&have.name.as_str()) {
            plan.deletes.push(have.name.clone());
        }
    }

    plan
}
