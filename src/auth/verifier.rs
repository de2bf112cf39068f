/// Single slot holding the PKCE verifier between the redirect and the callback.
///
/// Written once per authorization attempt and read at most once: `take` empties it.
#[derive(Default)]
pub struct VerifierSlot {
    value: Option<String>,
}

impl VerifierSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new attempt replaces whatever an abandoned one left behind.
    pub fn store(&mut self, verifier: String) {
        self.value = Some(verifier);
    }

    pub fn take(&mut self) -> Option<String> {
        self.value.take()
    }

    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }
}

// Keep the secret out of Debug output.
impl std::fmt::Debug for VerifierSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifierSlot")
            .field("occupied", &self.value.is_some())
            .finish()
    }
}
