//! Built-in AppleScript for common Excel operations.
//!
//! These skip the LLM entirely. Each script returns a confirmation string.
//!
//! Most entries are reached through the keyword matcher. The ones in
//! `CATALOG_ONLY` have no keyword rule; they run by id through
//! `ask-excel builtin <id>` (and `Pipeline::run_builtin`).

use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinScript {
    ConnectionTest,
    BoldHeader,
    BoldSelection,
    ItalicSelection,
    BlueFont,
    RedFont,
    GreenFont,
    FinancialStyle,
    Borders,
    BordersSelection,
    Autofit,
    Currency,
    Percent,
    NumberFormat,
    ReadSelection,
    ReadA1,
    SheetInfo,
    ClearSelection,
    DeleteRow,
    InsertRow,
    FreezeTopRow,
    Unfreeze,
}

impl BuiltinScript {
    pub const ALL: [BuiltinScript; 22] = [
        BuiltinScript::ConnectionTest,
        BuiltinScript::BoldHeader,
        BuiltinScript::BoldSelection,
        BuiltinScript::ItalicSelection,
        BuiltinScript::BlueFont,
        BuiltinScript::RedFont,
        BuiltinScript::GreenFont,
        BuiltinScript::FinancialStyle,
        BuiltinScript::Borders,
        BuiltinScript::BordersSelection,
        BuiltinScript::Autofit,
        BuiltinScript::Currency,
        BuiltinScript::Percent,
        BuiltinScript::NumberFormat,
        BuiltinScript::ReadSelection,
        BuiltinScript::ReadA1,
        BuiltinScript::SheetInfo,
        BuiltinScript::ClearSelection,
        BuiltinScript::DeleteRow,
        BuiltinScript::InsertRow,
        BuiltinScript::FreezeTopRow,
        BuiltinScript::Unfreeze,
    ];

    pub fn script(self) -> &'static str {
        match self {
            BuiltinScript::ConnectionTest => CONNECTION_TEST,
            BuiltinScript::BoldHeader => BOLD_ROW_1,
            BuiltinScript::BoldSelection => BOLD_SELECTION,
            BuiltinScript::ItalicSelection => ITALIC_SELECTION,
            BuiltinScript::BlueFont => BLUE_FONT,
            BuiltinScript::RedFont => RED_FONT,
            BuiltinScript::GreenFont => GREEN_FONT,
            BuiltinScript::FinancialStyle => FINANCIAL_STYLE,
            BuiltinScript::Borders => BORDERS_USED_RANGE,
            BuiltinScript::BordersSelection => BORDERS_SELECTION,
            BuiltinScript::Autofit => AUTOFIT_COLUMNS,
            BuiltinScript::Currency => FORMAT_CURRENCY,
            BuiltinScript::Percent => FORMAT_PERCENT,
            BuiltinScript::NumberFormat => FORMAT_NUMBER,
            BuiltinScript::ReadSelection => READ_SELECTION,
            BuiltinScript::ReadA1 => READ_A1,
            BuiltinScript::SheetInfo => SHEET_INFO,
            BuiltinScript::ClearSelection => CLEAR_SELECTION,
            BuiltinScript::DeleteRow => DELETE_ROW,
            BuiltinScript::InsertRow => INSERT_ROW,
            BuiltinScript::FreezeTopRow => FREEZE_TOP_ROW,
            BuiltinScript::Unfreeze => UNFREEZE_PANES,
        }
    }

    /// Stable snake_case id, as accepted by `FromStr`.
    pub fn id(self) -> &'static str {
        match self {
            BuiltinScript::ConnectionTest => "connection_test",
            BuiltinScript::BoldHeader => "bold_header",
            BuiltinScript::BoldSelection => "bold_selection",
            BuiltinScript::ItalicSelection => "italic_selection",
            BuiltinScript::BlueFont => "blue_font",
            BuiltinScript::RedFont => "red_font",
            BuiltinScript::GreenFont => "green_font",
            BuiltinScript::FinancialStyle => "financial_style",
            BuiltinScript::Borders => "borders",
            BuiltinScript::BordersSelection => "borders_selection",
            BuiltinScript::Autofit => "autofit",
            BuiltinScript::Currency => "currency",
            BuiltinScript::Percent => "percent",
            BuiltinScript::NumberFormat => "number_format",
            BuiltinScript::ReadSelection => "read_selection",
            BuiltinScript::ReadA1 => "read_a1",
            BuiltinScript::SheetInfo => "sheet_info",
            BuiltinScript::ClearSelection => "clear_selection",
            BuiltinScript::DeleteRow => "delete_row",
            BuiltinScript::InsertRow => "insert_row",
            BuiltinScript::FreezeTopRow => "freeze_top_row",
            BuiltinScript::Unfreeze => "unfreeze",
        }
    }

    pub fn is_catalog_only(self) -> bool {
        CATALOG_ONLY.contains(&self)
    }

    pub fn label(self) -> &'static str {
        match self {
            BuiltinScript::ConnectionTest => "connection test",
            BuiltinScript::BoldHeader => "bold row 1",
            BuiltinScript::BoldSelection => "bold selection",
            BuiltinScript::ItalicSelection => "italic selection",
            BuiltinScript::BlueFont => "blue font",
            BuiltinScript::RedFont => "red font",
            BuiltinScript::GreenFont => "green font",
            BuiltinScript::FinancialStyle => "financial style",
            BuiltinScript::Borders => "borders (used range)",
            BuiltinScript::BordersSelection => "borders (selection)",
            BuiltinScript::Autofit => "autofit columns",
            BuiltinScript::Currency => "currency format",
            BuiltinScript::Percent => "percent format",
            BuiltinScript::NumberFormat => "number format",
            BuiltinScript::ReadSelection => "read selection",
            BuiltinScript::ReadA1 => "read A1",
            BuiltinScript::SheetInfo => "sheet info",
            BuiltinScript::ClearSelection => "clear selection",
            BuiltinScript::DeleteRow => "delete row",
            BuiltinScript::InsertRow => "insert row",
            BuiltinScript::FreezeTopRow => "freeze top row",
            BuiltinScript::Unfreeze => "unfreeze panes",
        }
    }
}

/// Unknown built-in id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown built-in script: {0}")]
pub struct UnknownBuiltin(pub String);

impl FromStr for BuiltinScript {
    type Err = UnknownBuiltin;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        BuiltinScript::ALL
            .into_iter()
            .find(|b| b.id() == wanted)
            .ok_or_else(|| UnknownBuiltin(s.to_string()))
    }
}

/// Scripts with no keyword rule. Run by id only.
pub const CATALOG_ONLY: [BuiltinScript; 9] = [
    BuiltinScript::ItalicSelection,
    BuiltinScript::BlueFont,
    BuiltinScript::RedFont,
    BuiltinScript::GreenFont,
    BuiltinScript::NumberFormat,
    BuiltinScript::ReadA1,
    BuiltinScript::SheetInfo,
    BuiltinScript::DeleteRow,
    BuiltinScript::InsertRow,
];

/// Ready-made instructions offered by `ask-excel quick`.
pub struct QuickAction {
    pub title: &'static str,
    pub instruction: &'static str,
}

pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction { title: "Test Connection", instruction: "Test connection to Excel" },
    QuickAction {
        title: "Financial Style",
        instruction: "Apply financial style with blue inputs and black formulas",
    },
    QuickAction { title: "Bold Headers", instruction: "Bold row 1" },
    QuickAction { title: "Format Currency", instruction: "Format selection as currency" },
    QuickAction { title: "Format Percent", instruction: "Format selection as percent" },
    QuickAction { title: "Add Borders", instruction: "Add borders to used range" },
    QuickAction { title: "Auto-fit Columns", instruction: "Autofit columns" },
    QuickAction { title: "Read Selection", instruction: "Read selection values" },
    QuickAction { title: "Freeze Top Row", instruction: "Freeze top row" },
];

const BOLD_ROW_1: &str = r#"tell application "Microsoft Excel"
  activate
  set bold of font object of row 1 of active sheet to true
  return "Made row 1 bold"
end tell"#;

const BOLD_SELECTION: &str = r#"tell application "Microsoft Excel"
  activate
  set bold of font object of selection to true
  return "Made selection bold"
end tell"#;

const ITALIC_SELECTION: &str = r#"tell application "Microsoft Excel"
  activate
  set italic of font object of selection to true
  return "Made selection italic"
end tell"#;

const BLUE_FONT: &str = r#"tell application "Microsoft Excel"
  activate
  set color of font object of selection to {0, 0, 255}
  return "Set selection font to blue"
end tell"#;

const RED_FONT: &str = r#"tell application "Microsoft Excel"
  activate
  set color of font object of selection to {255, 0, 0}
  return "Set selection font to red"
end tell"#;

const GREEN_FONT: &str = r#"tell application "Microsoft Excel"
  activate
  set color of font object of selection to {0, 128, 0}
  return "Set selection font to green"
end tell"#;

const BORDERS_USED_RANGE: &str = r#"tell application "Microsoft Excel"
  activate
  tell used range of active sheet
    set weight of (get border which edge left) to border weight thin
    set weight of (get border which edge right) to border weight thin
    set weight of (get border which edge top) to border weight thin
    set weight of (get border which edge bottom) to border weight thin
  end tell
  return "Added borders to used range"
end tell"#;

const BORDERS_SELECTION: &str = r#"tell application "Microsoft Excel"
  activate
  tell selection
    set weight of (get border which edge left) to border weight thin
    set weight of (get border which edge right) to border weight thin
    set weight of (get border which edge top) to border weight thin
    set weight of (get border which edge bottom) to border weight thin
  end tell
  return "Added borders to selection"
end tell"#;

const AUTOFIT_COLUMNS: &str = r#"tell application "Microsoft Excel"
  activate
  autofit column of used range of active sheet
  return "Auto-fitted columns"
end tell"#;

const FORMAT_CURRENCY: &str = r#"tell application "Microsoft Excel"
  activate
  set number format of selection to "$#,##0.00"
  return "Formatted selection as currency"
end tell"#;

const FORMAT_PERCENT: &str = r#"tell application "Microsoft Excel"
  activate
  set number format of selection to "0.0%"
  return "Formatted selection as percent"
end tell"#;

const FORMAT_NUMBER: &str = r##"tell application "Microsoft Excel"
  activate
  set number format of selection to "#,##0.00"
  return "Formatted selection as number"
end tell"##;

// Blue constants, black formulas, bold header row.
const FINANCIAL_STYLE: &str = r#"tell application "Microsoft Excel"
  activate
  tell active sheet
    set rng to used range
    set rowCount to count rows of rng
    set colCount to count columns of rng
    set constCount to 0
    set formulaCount to 0
    repeat with r from 1 to rowCount
      repeat with c from 1 to colCount
        set theCell to cell r of column c of rng
        if value of theCell is not missing value then
          if has formula of theCell then
            set color of font object of theCell to {0, 0, 0}
            set formulaCount to formulaCount + 1
          else
            set color of font object of theCell to {0, 0, 255}
            set constCount to constCount + 1
          end if
        end if
      end repeat
    end repeat
    set bold of font object of row 1 of rng to true
    return "Applied financial style: " & constCount & " inputs (blue), " & formulaCount & " formulas (black), headers bold"
  end tell
end tell"#;

const READ_SELECTION: &str = r#"tell application "Microsoft Excel"
  set v to value of selection
  if v is missing value then
    return "Selection is empty"
  else
    return v as text
  end if
end tell"#;

const READ_A1: &str = r#"tell application "Microsoft Excel"
  set v to value of range "A1" of active sheet
  if v is missing value then
    return "A1 is empty"
  else
    return "A1 = " & (v as text)
  end if
end tell"#;

const SHEET_INFO: &str = r#"tell application "Microsoft Excel"
  tell active sheet
    set info to "Sheet: " & name
    try
      set rng to used range
      set info to info & ", Range: " & (get address of rng)
    end try
    return info
  end tell
end tell"#;

const CLEAR_SELECTION: &str = r#"tell application "Microsoft Excel"
  activate
  clear contents selection
  return "Cleared selection"
end tell"#;

const DELETE_ROW: &str = r#"tell application "Microsoft Excel"
  activate
  delete entire row of selection
  return "Deleted row"
end tell"#;

const INSERT_ROW: &str = r#"tell application "Microsoft Excel"
  activate
  insert into range (entire row of selection) shift shift down
  return "Inserted row"
end tell"#;

const FREEZE_TOP_ROW: &str = r#"tell application "Microsoft Excel"
  activate
  tell active sheet
    set freeze panes of (get window 1) to false
    select range "A2"
    set freeze panes of (get window 1) to true
  end tell
  return "Froze top row"
end tell"#;

const UNFREEZE_PANES: &str = r#"tell application "Microsoft Excel"
  activate
  set freeze panes of (get window 1) to false
  return "Unfroze panes"
end tell"#;

// Starts with "ERROR:" when no workbook is open.
const CONNECTION_TEST: &str = r#"tell application "Microsoft Excel"
  activate
  if not (exists active workbook) then
    return "ERROR: No workbook open"
  end if
  tell active sheet
    set sheetName to name
    set testVal to value of range "A1"
    if testVal is missing value then
      set testVal to "(empty)"
    end if
    return "OK: Sheet '" & sheetName & "', A1=" & (testVal as text)
  end tell
end tell"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::sanitize::{sanitize, validate};

    #[test]
    fn every_builtin_is_a_bounded_script() {
        for builtin in BuiltinScript::ALL {
            let script = builtin.script();
            assert!(validate(script), "{:?} lacks markers", builtin);
            assert!(script.starts_with("tell application \"Microsoft Excel\""));
            assert!(script.ends_with("end tell"));
            // Already clean: the sanitizer leaves it untouched.
            assert_eq!(sanitize(script), script, "{:?}", builtin);
        }
    }

    #[test]
    fn mutating_scripts_return_confirmation() {
        for builtin in BuiltinScript::ALL {
            assert!(builtin.script().contains("return"), "{:?}", builtin);
        }
    }

    #[test]
    fn number_formats_keep_their_hash_patterns() {
        assert!(BuiltinScript::NumberFormat
            .script()
            .contains(r##"set number format of selection to "#,##0.00""##));
        assert!(BuiltinScript::Currency.script().contains(r#""$#,##0.00""#));
        assert!(BuiltinScript::NumberFormat
            .script()
            .ends_with("return \"Formatted selection as number\"\nend tell"));
    }

    #[test]
    fn ids_parse_back() {
        for builtin in BuiltinScript::ALL {
            assert_eq!(builtin.id().parse::<BuiltinScript>(), Ok(builtin));
        }
        assert_eq!("Read-A1".parse::<BuiltinScript>(), Ok(BuiltinScript::ReadA1));
        assert!("sparkline".parse::<BuiltinScript>().is_err());
    }

    #[test]
    fn catalog_only_entries_are_flagged() {
        assert!(BuiltinScript::InsertRow.is_catalog_only());
        assert!(!BuiltinScript::Autofit.is_catalog_only());
    }

    #[test]
    fn labels_are_unique() {
        let mut labels: Vec<_> = BuiltinScript::ALL.iter().map(|b| b.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), BuiltinScript::ALL.len());
    }
}
