use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;
use serde::Serialize;

/// Area of the file a check covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum CheckCategory {
    /// Document structure and run metadata
    Structure,
    /// Binary data arrays
    BinaryArrays,
    /// FLASHDeconv userParam annotations
    Annotation,
    /// indexList offsets
    Index,
    /// fileChecksum
    Checksum,
}

impl CheckCategory {
    fn title(&self) -> &'static str {
        match self {
            CheckCategory::Structure => "Structure",
            CheckCategory::BinaryArrays => "Binary arrays",
            CheckCategory::Annotation => "Annotations",
            CheckCategory::Index => "Index",
            CheckCategory::Checksum => "Checksum",
        }
    }
}

/// Validation check result status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check passed with warnings
    Warning(String),
    /// Check failed
    Failed(String),
}

impl CheckStatus {
    fn is_ok(&self) -> bool {
        matches!(self, CheckStatus::Ok)
    }

    fn is_warning(&self) -> bool {
        matches!(self, CheckStatus::Warning(_))
    }

    fn is_failed(&self) -> bool {
        matches!(self, CheckStatus::Failed(_))
    }
}

/// Individual validation check result
#[derive(Debug, Clone, Serialize)]
pub struct ValidationCheck {
    /// Area of the check
    pub category: CheckCategory,
    /// Name of the validation check
    pub name: String,
    /// Result status of the check
    pub status: CheckStatus,
}

impl ValidationCheck {
    pub(crate) fn ok(category: CheckCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
            status: CheckStatus::Ok,
        }
    }

    pub(crate) fn warning(
        category: CheckCategory,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            status: CheckStatus::Warning(message.into()),
        }
    }

    pub(crate) fn failed(
        category: CheckCategory,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            name: name.into(),
            status: CheckStatus::Failed(message.into()),
        }
    }
}

/// Complete validation report for an mzML file
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    /// Individual check results in the order they ran
    pub checks: Vec<ValidationCheck>,
    /// Path of the file that was validated
    pub file_path: String,
}

impl ValidationReport {
    /// Create a new validation report for the given file path
    pub fn new(file_path: impl Into<String>) -> Self {
        Self {
            checks: Vec::new(),
            file_path: file_path.into(),
        }
    }

    /// Add a validation check result to the report
    pub fn add_check(&mut self, check: ValidationCheck) {
        self.checks.push(check);
    }

    /// Checks of one category
    pub fn checks_in(&self, category: CheckCategory) -> impl Iterator<Item = &ValidationCheck> {
        self.checks.iter().filter(move |c| c.category == category)
    }

    /// Check if any validation checks failed
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_failed())
    }

    /// Check if any validation checks produced warnings
    pub fn has_warnings(&self) -> bool {
        self.checks.iter().any(|c| c.status.is_warning())
    }

    /// Count the number of successful checks
    pub fn success_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_ok()).count()
    }

    /// Count the number of warnings
    pub fn warning_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_warning()).count()
    }

    /// Count the number of failures
    pub fn failure_count(&self) -> usize {
        self.checks.iter().filter(|c| c.status.is_failed()).count()
    }

    fn categories(&self) -> Vec<CheckCategory> {
        let mut categories: Vec<CheckCategory> = self.checks.iter().map(|c| c.category).collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();

            output.push_str(&format!("{}\n", style("mzML Validation Report").bold().cyan()));
            output.push_str(&format!("{}: {}\n", style("File").bold(), self.file_path));

            for category in self.categories() {
                output.push_str(&format!("\n{}\n", style(category.title()).bold()));
                for check in self.checks_in(category) {
                    let symbol = match &check.status {
                        CheckStatus::Ok => style(OK.to_string()).green(),
                        CheckStatus::Warning(_) => style(WARN.to_string()).yellow(),
                        CheckStatus::Failed(_) => style(FAIL.to_string()).red(),
                    };
                    output.push_str(&format!("  {} {}", symbol, check.name));

                    match &check.status {
                        CheckStatus::Ok => output.push('\n'),
                        CheckStatus::Warning(msg) => {
                            output.push_str(&format!(" - {}\n", style(msg).yellow()));
                        }
                        CheckStatus::Failed(msg) => {
                            output.push_str(&format!(" - {}\n", style(msg).red()));
                        }
                    }
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} passed, {} warnings, {} failed\n",
                style("Summary").bold(),
                style(self.success_count()).green(),
                style(self.warning_count()).yellow(),
                style(self.failure_count()).red()
            ));

            if self.has_failures() {
                output.push_str(&format!("{}\n", style("Validation FAILED").red().bold()));
            } else {
                output.push_str(&format!("{}\n", style("Validation PASSED").green().bold()));
            }

            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "mzML Validation Report")?;
        writeln!(f, "File: {}", self.file_path)?;

        for category in self.categories() {
            writeln!(f)?;
            writeln!(f, "{}", category.title())?;
            for check in self.checks_in(category) {
                match &check.status {
                    CheckStatus::Ok => writeln!(f, "  [OK] {}", check.name)?,
                    CheckStatus::Warning(msg) => writeln!(f, "  [WARN] {} - {}", check.name, msg)?,
                    CheckStatus::Failed(msg) => writeln!(f, "  [FAIL] {} - {}", check.name, msg)?,
                }
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} passed, {} warnings, {} failed",
            self.success_count(),
            self.warning_count(),
            self.failure_count()
        )?;

        if self.has_failures() {
            writeln!(f, "Validation FAILED")
        } else {
            writeln!(f, "Validation PASSED")
        }
    }
}
