//! Per-turn inputs and outputs of the control loop

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Input signal observed by the control loop for one turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInteractionSignal {
    /// 1-based turn number
    pub turn_id: u32,
    /// Raw user input for the turn
    pub user_input: String,
    /// Facts learned this turn
    pub new_facts: Vec<String>,
    /// Entities the user is focusing on
    pub focus_entities: Vec<String>,
    /// Goal currently being pursued
    pub active_goal: Option<String>,
    /// Constraints that must be respected
    pub active_constraints: Vec<String>,
    /// Anticipated next steps
    pub expected_next_steps: Vec<String>,
}

impl TurnInteractionSignal {
    /// Create a signal with only the required fields
    pub fn new(turn_id: u32, user_input: impl Into<String>) -> Result<Self, ValidationError> {
        let user_input = user_input.into();
        if turn_id < 1 {
            return Err(ValidationError::InvalidArgument(
                "turn_id must be at least 1".to_string(),
            ));
        }
        if user_input.trim().is_empty() {
            return Err(ValidationError::InvalidArgument(
                "user_input must not be empty".to_string(),
            ));
        }

        Ok(Self {
            turn_id,
            user_input,
            new_facts: Vec::new(),
            focus_entities: Vec::new(),
            active_goal: None,
            active_constraints: Vec::new(),
            expected_next_steps: Vec::new(),
        })
    }

    /// Set the active goal
    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.active_goal = Some(goal.into());
        self
    }

    /// Set the new facts
    pub fn with_new_facts<I, S>(mut self, facts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.new_facts = facts.into_iter().map(Into::into).collect();
        self
    }

    /// Set the focus entities
    pub fn with_focus_entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.focus_entities = entities.into_iter().map(Into::into).collect();
        self
    }

    /// Set the active constraints
    pub fn with_constraints<I, S>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_constraints = constraints.into_iter().map(Into::into).collect();
        self
    }

    /// Set the expected next steps
    pub fn with_next_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expected_next_steps = steps.into_iter().map(Into::into).collect();
        self
    }

    /// Active goal, if present and not blank
    pub fn goal(&self) -> Option<&str> {
        self.active_goal
            .as_deref()
            .map(str::trim)
            .filter(|goal| !goal.is_empty())
    }
}

/// Response and tool actions produced by the agent policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDecision {
    /// Text returned to the user
    pub response: String,
    /// Tool invocations requested by the policy
    pub tool_actions: Vec<String>,
}

impl AgentDecision {
    /// Create a decision without tool actions
    pub fn new(response: impl Into<String>) -> Result<Self, ValidationError> {
        Self::with_tool_actions(response, Vec::<String>::new())
    }

    /// Create a decision with tool actions
    pub fn with_tool_actions<I, S>(
        response: impl Into<String>,
        tool_actions: I,
    ) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let response = response.into();
        if response.is_empty() {
            return Err(ValidationError::InvalidArgument(
                "response must not be empty".to_string(),
            ));
        }
        Ok(Self {
            response,
            tool_actions: tool_actions.into_iter().map(Into::into).collect(),
        })
    }
}

/// One exchange of the short dialogue history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentDialogueTurn {
    pub turn_id: u32,
    pub user_input: String,
    pub assistant_response: String,
}

impl RecentDialogueTurn {
    pub fn new(
        turn_id: u32,
        user_input: impl Into<String>,
        assistant_response: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let user_input = user_input.into();
        let assistant_response = assistant_response.into();
        if turn_id < 1 {
            return Err(ValidationError::InvalidArgument(
                "turn_id must be at least 1".to_string(),
            ));
        }
        if user_input.is_empty() || assistant_response.is_empty() {
            return Err(ValidationError::InvalidArgument(
                "dialogue turn text must not be empty".to_string(),
            ));
        }
        Ok(Self {
            turn_id,
            user_input,
            assistant_response,
        })
    }
}
