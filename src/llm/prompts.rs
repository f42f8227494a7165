//! Script-generation prompt — rules, worked examples, live context.
//!
//! The examples are known-good Excel for Mac AppleScript; the model copies
//! their shape far more reliably than it follows prose rules alone.

pub const PROMPT_RULES: &str = r#"RULES:
1. Output ONLY the AppleScript code - no markdown, no explanation
2. Always start with: tell application "Microsoft Excel"
3. Always use "activate" after tell
4. Perform ALL actions inside specific "tell active sheet" block
5. Return a success message at the end using "return""#;

pub const PROMPT_EXAMPLES: &str = r#"WORKING EXAMPLES:

Example 1 - Set multiple values:
tell application "Microsoft Excel"
  activate
  tell active sheet
    set value of range "A1" to "Revenue"
    set value of range "B1" to 1000
    set value of range "A2" to "Cost"
    set value of range "B2" to 800
    return "Set A1:B2 values"
  end tell
end tell

Example 2 - Format and Style:
tell application "Microsoft Excel"
  activate
  tell active sheet
    set bold of font object of range "A1:Z1" to true
    set color of font object of range "A1:Z1" to {255, 255, 255} -- White
    set color of interior object of range "A1:Z1" to {0, 0, 255} -- Blue
    autofit column of range "A:Z"
    return "Formatted header row"
  end tell
end tell

Example 3 - Formulas:
tell application "Microsoft Excel"
  activate
  tell active sheet
    set formula of range "C2" to "=A2+B2"
    set number format of range "C2" to "0.00%"
    return "Set formula in C2"
  end tell
end tell

Example 4 - Loop through cells (Advanced):
tell application "Microsoft Excel"
  activate
  tell active sheet
    set rng to used range
    set rowCount to count rows of rng
    set colCount to count columns of rng
    repeat with r from 1 to rowCount
      repeat with c from 1 to colCount
        set theCell to cell r of column c of rng
        -- Only format non-empty cells
        if value of theCell is not missing value then
           set color of font object of theCell to {0, 0, 0}
        end if
      end repeat
    end repeat
    return "Processed all cells"
  end tell
end tell

Example 5 - COMPLEX BATCH TASK (Create Table + Format):
tell application "Microsoft Excel"
  activate
  tell active sheet
    -- 1. Setup Data
    set value of range "A1" to "Month"
    set value of range "B1" to "Sales"
    set value of range "A2" to "Jan"
    set value of range "B2" to 100
    set value of range "A3" to "Feb"
    set value of range "B3" to 150

    -- 2. Format Header
    set bold of font object of range "A1:B1" to true
    set color of interior object of range "A1:B1" to {200, 200, 200}

    -- 3. Format Data
    set number format of range "B2:B3" to "$#,##0"
    autofit column of range "A:B"

    return "Created sales table with formatting"
  end tell
end tell"#;

/// Build the generation prompt for one instruction.
///
/// Pure: the same instruction and context always give the same prompt.
pub fn build_prompt(instruction: &str, context: &str) -> String {
    format!(
        "Generate AppleScript for Excel on Mac.\n\n\
         CONTEXT: {context}\n\
         TASK: {instruction}\n\n\
         {PROMPT_RULES}\n\n\
         {PROMPT_EXAMPLES}\n\n\
         NOW GENERATE CODE:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_instruction_and_context_verbatim() {
        let prompt = build_prompt(
            "Make column totals stand out {and} 100%",
            "Sheet: Q3 \"Budget\", Selection: $B$2:$B$9",
        );
        assert!(prompt.contains("TASK: Make column totals stand out {and} 100%"));
        assert!(prompt.contains("CONTEXT: Sheet: Q3 \"Budget\", Selection: $B$2:$B$9"));
    }

    #[test]
    fn has_five_examples_and_rules() {
        let prompt = build_prompt("x", "y");
        for n in 1..=5 {
            assert!(prompt.contains(&format!("Example {} -", n)));
        }
        assert!(prompt.contains("Output ONLY the AppleScript code"));
        assert!(prompt.trim_end().ends_with("NOW GENERATE CODE:"));
    }

    #[test]
    fn deterministic() {
        assert_eq!(build_prompt("a", "b"), build_prompt("a", "b"));
    }
}
