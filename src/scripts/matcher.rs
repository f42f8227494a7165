//! Intent matcher — instruction text to a built-in script.
//!
//! An ordered rule table over lower-cased substrings. The first rule that
//! holds wins, so "bold the header" resolves to row 1 even though it could
//! also read as a selection request.

use super::catalog::BuiltinScript;

/// A single keyword test against the lower-cased instruction.
enum Cond {
    Has(&'static str),
    Lacks(&'static str),
    All(&'static [Cond]),
    Any(&'static [Cond]),
}

impl Cond {
    fn holds(&self, text: &str) -> bool {
        match self {
            Cond::Has(word) => text.contains(word),
            Cond::Lacks(word) => !text.contains(word),
            Cond::All(conds) => conds.iter().all(|c| c.holds(text)),
            Cond::Any(conds) => conds.iter().any(|c| c.holds(text)),
        }
    }
}

use Cond::{All, Any, Has, Lacks};

/// Priority-ordered rules. First match wins.
const RULES: &[(Cond, BuiltinScript)] = &[
    (All(&[Has("test"), Has("connection")]), BuiltinScript::ConnectionTest),
    (
        All(&[Has("bold"), Any(&[Has("row 1"), Has("first row"), Has("header")])]),
        BuiltinScript::BoldHeader,
    ),
    (All(&[Has("bold"), Has("selection")]), BuiltinScript::BoldSelection),
    (All(&[Has("financial"), Has("style")]), BuiltinScript::FinancialStyle),
    (
        All(&[Has("blue"), Any(&[Has("input"), Has("constant")])]),
        BuiltinScript::FinancialStyle,
    ),
    (All(&[Has("border"), Lacks("selection")]), BuiltinScript::Borders),
    (All(&[Has("border"), Has("selection")]), BuiltinScript::BordersSelection),
    (
        Any(&[All(&[Has("auto"), Has("fit")]), Has("autofit")]),
        BuiltinScript::Autofit,
    ),
    (Any(&[Has("currency"), Has("dollar")]), BuiltinScript::Currency),
    (Has("percent"), BuiltinScript::Percent),
    (All(&[Has("read"), Has("selection")]), BuiltinScript::ReadSelection),
    (All(&[Has("clear"), Has("selection")]), BuiltinScript::ClearSelection),
    (
        All(&[Has("freeze"), Any(&[Has("row"), Has("top")])]),
        BuiltinScript::FreezeTopRow,
    ),
    (Has("unfreeze"), BuiltinScript::Unfreeze),
];

/// Find the built-in script for an instruction, if any rule matches.
pub fn match_instruction(instruction: &str) -> Option<BuiltinScript> {
    let lower = instruction.to_lowercase();
    RULES
        .iter()
        .find(|(cond, _)| cond.holds(&lower))
        .map(|(_, builtin)| *builtin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Option<BuiltinScript> {
        match_instruction(s)
    }

    #[test]
    fn quick_actions_all_resolve() {
        for qa in crate::scripts::catalog::QUICK_ACTIONS {
            assert!(m(qa.instruction).is_some(), "{}", qa.instruction);
        }
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(m("TEST CONNECTION"), Some(BuiltinScript::ConnectionTest));
        assert_eq!(m("Bold The Header Row"), Some(BuiltinScript::BoldHeader));
    }

    #[test]
    fn header_beats_selection_for_bold() {
        assert_eq!(m("bold the header of my selection"), Some(BuiltinScript::BoldHeader));
        assert_eq!(m("bold selection"), Some(BuiltinScript::BoldSelection));
    }

    #[test]
    fn financial_style_variants() {
        assert_eq!(m("apply financial style"), Some(BuiltinScript::FinancialStyle));
        assert_eq!(m("make inputs blue"), Some(BuiltinScript::FinancialStyle));
        assert_eq!(m("blue constants please"), Some(BuiltinScript::FinancialStyle));
    }

    #[test]
    fn borders_split_on_selection() {
        assert_eq!(m("add borders"), Some(BuiltinScript::Borders));
        assert_eq!(m("add a border around the selection"), Some(BuiltinScript::BordersSelection));
    }

    #[test]
    fn autofit_spellings() {
        assert_eq!(m("autofit columns"), Some(BuiltinScript::Autofit));
        assert_eq!(m("auto fit everything"), Some(BuiltinScript::Autofit));
        assert_eq!(m("auto-fit"), Some(BuiltinScript::Autofit));
    }

    #[test]
    fn number_formats() {
        assert_eq!(m("format as dollars"), Some(BuiltinScript::Currency));
        assert_eq!(m("show as percentage"), Some(BuiltinScript::Percent));
    }

    #[test]
    fn read_and_clear() {
        assert_eq!(m("read selection"), Some(BuiltinScript::ReadSelection));
        assert_eq!(m("clear the selection"), Some(BuiltinScript::ClearSelection));
    }

    #[test]
    fn freeze_rules_follow_table_order() {
        assert_eq!(m("freeze top row"), Some(BuiltinScript::FreezeTopRow));
        assert_eq!(m("unfreeze"), Some(BuiltinScript::Unfreeze));
        // "unfreeze" contains "freeze"; with "row" present the freeze rule is first.
        assert_eq!(m("unfreeze the top row"), Some(BuiltinScript::FreezeTopRow));
    }

    #[test]
    fn catalog_only_scripts_have_no_keyword_rule() {
        for builtin in crate::scripts::CATALOG_ONLY {
            assert_eq!(m(builtin.label()), None, "{:?}", builtin);
            assert!(RULES.iter().all(|(_, b)| *b != builtin), "{:?}", builtin);
        }
    }

    #[test]
    fn unmatched_goes_to_ai() {
        assert_eq!(m("make column totals stand out"), None);
        assert_eq!(m(""), None);
        assert_eq!(m("bold"), None);
    }

    #[test]
    fn deterministic() {
        for _ in 0..3 {
            assert_eq!(
                m("bold the header row").map(|b| b.script()),
                Some(BuiltinScript::BoldHeader.script())
            );
        }
    }
}
