use std::fmt;

/// One incoming user turn
#[derive(Clone, PartialEq, Eq)]
pub struct DispatchRequest {
    /// Whose history and selection this turn belongs to
    pub user_id: String,
    /// Identity checked against the restricted-tier allow-list
    pub requester: String,
    pub text: String,
    /// Raw image bytes; dropped for models without image support
    pub image: Option<Vec<u8>>,
}

impl DispatchRequest {
    pub fn new(user_id: impl Into<String>, text: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            requester: user_id.clone(),
            user_id,
            text: text.into(),
            image: None,
        }
    }

    pub fn with_requester(mut self, requester: impl Into<String>) -> Self {
        self.requester = requester.into();
        self
    }

    pub fn with_image(mut self, image: Vec<u8>) -> Self {
        self.image = Some(image);
        self
    }
}

impl fmt::Debug for DispatchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchRequest")
            .field("user_id", &self.user_id)
            .field("requester", &self.requester)
            .field("text_len", &self.text.chars().count())
            .field("image_bytes", &self.image.as_ref().map(Vec::len))
            .finish()
    }
}
