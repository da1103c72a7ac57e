/// Options for filtering filing requests
#[derive(Debug, Clone, Default)]
pub struct FilingOptions {
    pub form_types: Option<Vec<String>>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    /// Whether to also match amendment forms (e.g., S-1/A when S-1 is requested).
    /// Defaults to false.
    pub include_amendments: bool,
}

impl FilingOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form_type(mut self, form_type: impl Into<String>) -> Self {
        self.form_types = Some(vec![form_type.into()]);
        self
    }

    pub fn with_form_types(mut self, form_types: Vec<String>) -> Self {
        self.form_types = Some(form_types);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set whether to include amendment forms automatically.
    ///
    /// When true, requesting "S-1" also returns "S-1/A" filings.
    /// When false (default), only the exact form type is returned.
    pub fn with_include_amendments(mut self, include_amendments: bool) -> Self {
        self.include_amendments = include_amendments;
        self
    }

    /// Whether a filing's form passes the form-type filter.
    pub fn matches_form(&self, form: &str) -> bool {
        let Some(form_types) = &self.form_types else {
            return true;
        };
        let form = form.trim();
        form_types.iter().any(|wanted| {
            form == wanted
                || (self.include_amendments
                    && form
                        .strip_prefix(wanted.as_str())
                        .is_some_and(|rest| rest == "/A"))
        })
    }
}
