//! Shader source accumulation for one compile pass.
//!
//! The builder owns the text of the shader being assembled: an ordered
//! statement buffer plus a registry of helper functions. Helper
//! registration is idempotent; generators request helpers unconditionally
//! and the builder guarantees each function body appears at most once in
//! the final program (duplicate definitions are a hard compile error in
//! GLSL).

use std::collections::HashSet;

/// Accumulates fragment shader source for a single compile pass.
///
/// Not shared between passes; concurrent compiles each use their own
/// builder, so the dedup check-and-insert is single-writer by construction.
#[derive(Debug, Default)]
pub struct FragmentShaderBuilder {
    functions: Vec<String>,
    seen_functions: HashSet<String>,
    code: String,
}

impl FragmentShaderBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement (or block-structural line) to the shader body.
    pub fn code_append(&mut self, code: &str) {
        self.code.push_str(code);
        self.code.push('\n');
    }

    /// Register a helper function definition.
    ///
    /// Idempotent: registering the same text again is a no-op, and
    /// first-registration order is preserved in the final program.
    pub fn add_function(&mut self, function: &str) {
        let key = function.trim().to_string();
        if self.seen_functions.insert(key.clone()) {
            self.functions.push(key);
        }
    }

    /// The statement body accumulated so far.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Registered helper functions, in first-registration order.
    pub fn functions(&self) -> &[String] {
        &self.functions
    }

    /// Serialize the accumulated shader text: helper functions first, then
    /// the statement body in append order.
    pub fn shader_text(&self) -> String {
        let mut out = String::new();
        for function in &self.functions {
            out.push_str(function);
            out.push_str("\n\n");
        }
        out.push_str(&self.code);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_appends_in_order() {
        let mut builder = FragmentShaderBuilder::new();
        builder.code_append("vec4 a = vec4(0.0);");
        builder.code_append("vec4 b = a;");
        assert_eq!(builder.code(), "vec4 a = vec4(0.0);\nvec4 b = a;\n");
    }

    #[test]
    fn test_add_function_is_idempotent() {
        let mut builder = FragmentShaderBuilder::new();
        let body = "float half_of(float x) { return 0.5 * x; }";
        builder.add_function(body);
        builder.add_function(body);
        builder.add_function(&format!("\n{body}\n")); // whitespace-insensitive
        assert_eq!(builder.functions().len(), 1);
        assert_eq!(builder.shader_text().matches("float half_of").count(), 1);
    }

    #[test]
    fn test_functions_precede_code_in_shader_text() {
        let mut builder = FragmentShaderBuilder::new();
        builder.code_append("color = half_of(color);");
        builder.add_function("float half_of(float x) { return 0.5 * x; }");
        let text = builder.shader_text();
        let fn_pos = text.find("float half_of").unwrap();
        let code_pos = text.find("color = half_of").unwrap();
        assert!(fn_pos < code_pos);
    }

    #[test]
    fn test_distinct_functions_keep_registration_order() {
        let mut builder = FragmentShaderBuilder::new();
        builder.add_function("float f() { return 1.0; }");
        builder.add_function("float g() { return 2.0; }");
        builder.add_function("float f() { return 1.0; }");
        assert_eq!(builder.functions().len(), 2);
        assert!(builder.functions()[0].contains("float f"));
        assert!(builder.functions()[1].contains("float g"));
    }
}
