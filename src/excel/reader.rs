//! Selection reader — dumps the current selection as text.

use super::context::is_running;
use super::runner::ScriptRunner;
use crate::error::ExecutionError;

pub const READ_SELECTION_SCRIPT: &str = r#"tell application "Microsoft Excel"
  if not (exists active workbook) then return "No workbook open"

  tell active sheet
    set output to "Sheet: " & name & return & return

    try
      set sel to selection
      set selAddr to get address of sel
      set output to output & "Selection: " & selAddr & return

      set vals to value of sel
      if class of vals is list then
        repeat with row in vals
          if class of row is list then
            set rowStr to ""
            repeat with cell in row
              if cell is missing value then
                set rowStr to rowStr & "[empty] "
              else
                set rowStr to rowStr & (cell as text) & " "
              end if
            end repeat
            set output to output & rowStr & return
          else
            set output to output & (row as text) & return
          end if
        end repeat
      else
        set output to output & "Value: " & (vals as text) & return
      end if
    on error
      set output to output & "Could not read selection" & return
    end try

    try
      set rng to used range
      set output to output & return & "Used range: " & (get address of rng)
    end try

    return output
  end tell
end tell"#;

/// Read sheet name, selection address and values, and the used range.
pub async fn read_selection(runner: &dyn ScriptRunner) -> Result<String, ExecutionError> {
    if !is_running(runner).await {
        return Err(ExecutionError::ApplicationUnreachable);
    }
    runner
        .run(READ_SELECTION_SCRIPT)
        .await
        .map(|out| out.replace('\r', "\n"))
        .map_err(|f| super::errors::classify(&f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excel::context::IS_RUNNING_SCRIPT;
    use crate::excel::runner::ScriptFailure;
    use async_trait::async_trait;

    struct Excel {
        running: bool,
    }

    #[async_trait]
    impl ScriptRunner for Excel {
        async fn run(&self, script: &str) -> Result<String, ScriptFailure> {
            if script == IS_RUNNING_SCRIPT {
                return Ok(self.running.to_string());
            }
            Ok("Sheet: Data\r\rSelection: $A$1:$B$1\r1 2 \r\rUsed range: $A$1:$B$4".into())
        }
    }

    #[tokio::test]
    async fn normalises_applescript_line_breaks() {
        let out = read_selection(&Excel { running: true }).await.unwrap();
        assert!(out.contains("Selection: $A$1:$B$1\n1 2"));
        assert!(!out.contains('\r'));
    }

    #[tokio::test]
    async fn refuses_when_excel_is_closed() {
        let err = read_selection(&Excel { running: false }).await.unwrap_err();
        assert_eq!(err, ExecutionError::ApplicationUnreachable);
    }
}
