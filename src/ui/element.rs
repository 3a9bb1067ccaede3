const NON_TEXT_INPUT_TYPES: [&str; 4] = ["button", "submit", "checkbox", "radio"];

/// What the page agent needs to know about a DOM element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementInfo {
    pub tag_name: String,
    pub input_type: Option<String>,
    pub content_editable: bool,
}

impl ElementInfo {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn textarea() -> Self {
        Self::new("textarea")
    }

    pub fn input(input_type: impl Into<String>) -> Self {
        Self {
            input_type: Some(input_type.into()),
            ..Self::new("input")
        }
    }

    pub fn editable(tag_name: impl Into<String>) -> Self {
        Self {
            content_editable: true,
            ..Self::new(tag_name)
        }
    }

    /// `textarea` or `input` other than button-like types, or anything
    /// `contenteditable`.
    pub fn is_text_input(&self) -> bool {
        if self.content_editable {
            return true;
        }

        let tag = self.tag_name.to_ascii_lowercase();
        if tag != "textarea" && tag != "input" {
            return false;
        }

        match self.input_type.as_deref() {
            Some(input_type) => !NON_TEXT_INPUT_TYPES
                .iter()
                .any(|blocked| input_type.eq_ignore_ascii_case(blocked)),
            None => true,
        }
    }
}
