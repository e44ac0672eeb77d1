use serde::{Deserialize, Serialize};

use crate::domain::invoice::FieldErrors;

/// Feedback rendered back into a form when an action does not redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub errors: Option<FieldErrors>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message: Option<String>,
}

impl FormState {
  pub fn invalid(errors: FieldErrors, message: &str) -> Self {
    Self {
      errors: Some(errors),
      message: Some(message.to_string()),
    }
  }

  pub fn message(message: &str) -> Self {
    Self {
      errors: None,
      message: Some(message.to_string()),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.errors.is_none() && self.message.is_none()
  }
}

/// What a form action asks the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
  /// Navigate the browser to `path`.
  Redirect { path: String },
  /// Stay on the page and render this state.
  State(FormState),
}

impl ActionOutcome {
  pub fn redirect(path: &str) -> Self {
    ActionOutcome::Redirect {
      path: path.to_string(),
    }
  }

  pub fn is_redirect(&self) -> bool {
    matches!(self, ActionOutcome::Redirect { .. })
  }

  pub fn state(&self) -> Option<&FormState> {
    match self {
      ActionOutcome::State(state) => Some(state),
      ActionOutcome::Redirect { .. } => None,
    }
  }
}
