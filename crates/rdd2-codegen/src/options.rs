//! Code generator options
//!
//! The option names follow the usual symbolic-framework code generator set.
//! The backend emits freestanding C only, so options that ask for a MEX
//! gateway, a `main` entry point, memory objects or imported functions are
//! recognised but rejected.

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

/// Scalar types accepted for `real_type`
pub const REAL_TYPES: [&str; 2] = ["double", "float"];

/// Recognised options that may not be enabled
pub const UNSUPPORTED: [&str; 4] = ["mex", "main", "with_mem", "with_import"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodegenOptions {
    /// Annotate each instruction with the operation it performs
    pub verbose: bool,
    /// Emit a MATLAB MEX gateway (unsupported)
    pub mex: bool,
    /// Name the source `.cpp` instead of `.c`
    pub cpp: bool,
    /// Emit a command-line `main` (unsupported)
    pub main: bool,
    /// Write a header alongside the source
    pub with_header: bool,
    /// Emit memory management entry points (unsupported)
    pub with_mem: bool,
    /// Prefix entry points with an export macro
    pub with_export: bool,
    /// Import external functions (unsupported)
    pub with_import: bool,
    /// `#include <math.h>`
    pub include_math: bool,
    /// Keep temporaries in the caller's work vector instead of on the stack
    pub avoid_stack: bool,
    /// C type of every real value
    pub real_type: String,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            mex: false,
            cpp: false,
            main: false,
            with_header: true,
            with_mem: false,
            with_export: false,
            with_import: false,
            include_math: true,
            avoid_stack: true,
            real_type: "double".to_string(),
        }
    }
}

impl CodegenOptions {
    pub fn from_json_str(json: &str) -> Result<Self, CodegenError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Set a boolean option by name
    ///
    /// The options are left unchanged on error.
    pub fn set(&mut self, key: &str, value: bool) -> Result<(), CodegenError> {
        if value && UNSUPPORTED.contains(&key) {
            return Err(CodegenError::UnsupportedOption(key.to_string()));
        }
        let slot = match key {
            "verbose" => &mut self.verbose,
            "mex" => &mut self.mex,
            "cpp" => &mut self.cpp,
            "main" => &mut self.main,
            "with_header" => &mut self.with_header,
            "with_mem" => &mut self.with_mem,
            "with_export" => &mut self.with_export,
            "with_import" => &mut self.with_import,
            "include_math" => &mut self.include_math,
            "avoid_stack" => &mut self.avoid_stack,
            _ => return Err(CodegenError::UnknownOption(key.to_string())),
        };
        *slot = value;
        Ok(())
    }

    /// Reject options the backend cannot honour
    pub fn validate(&self) -> Result<(), CodegenError> {
        let enabled = [self.mex, self.main, self.with_mem, self.with_import];
        if let Some((name, _)) = UNSUPPORTED.iter().zip(enabled).find(|(_, on)| *on) {
            return Err(CodegenError::UnsupportedOption(name.to_string()));
        }

        if !REAL_TYPES.contains(&self.real_type.as_str()) {
            return Err(CodegenError::UnsupportedOption(format!(
                "real_type = {}",
                self.real_type
            )));
        }

        Ok(())
    }

    /// Required extension of the source file
    pub fn source_extension(&self) -> &'static str {
        if self.cpp {
            "cpp"
        } else {
            "c"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = CodegenOptions::default();
        assert!(options.validate().is_ok());
        assert!(options.verbose && options.with_header && options.include_math && options.avoid_stack);
        assert_eq!(options.source_extension(), "c");
    }

    #[test]
    fn test_set_known_option() {
        let mut options = CodegenOptions::default();
        options.set("cpp", true).unwrap();
        options.set("avoid_stack", false).unwrap();

        assert!(options.cpp);
        assert!(!options.avoid_stack);
        assert_eq!(options.source_extension(), "cpp");
    }

    #[test]
    fn test_set_unknown_option() {
        let mut options = CodegenOptions::default();
        assert!(matches!(
            options.set("with_sparsity", true),
            Err(CodegenError::UnknownOption(key)) if key == "with_sparsity"
        ));
    }

    #[test]
    fn test_unsupported_option_is_rejected() {
        let mut options = CodegenOptions::default();
        assert!(matches!(
            options.set("mex", true),
            Err(CodegenError::UnsupportedOption(key)) if key == "mex"
        ));
        assert!(!options.mex);
        options.set("mex", false).unwrap();
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        assert!(matches!(
            CodegenOptions::from_json_str(r#"{ "verbose": false, "stack": true }"#),
            Err(CodegenError::Parse(_))
        ));

        let options = CodegenOptions::from_json_str(r#"{ "verbose": false }"#).unwrap();
        assert!(!options.verbose);
        assert!(options.avoid_stack);
    }

    #[test]
    fn test_real_type_is_checked() {
        let options = CodegenOptions::from_json_str(r#"{ "real_type": "float" }"#).unwrap();
        assert_eq!(options.real_type, "float");

        assert!(matches!(
            CodegenOptions::from_json_str(r#"{ "real_type": "int" }"#),
            Err(CodegenError::UnsupportedOption(_))
        ));
    }
}
