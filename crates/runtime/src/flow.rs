use serde::{Deserialize, Serialize};

use crate::{Character, CharacterDraft, CharacterValidationError, QuizStep, QuizValue, QUIZ_STEPS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum FlowScreen {
    #[serde(rename_all = "camelCase")]
    Quiz { step_index: usize },
    Result,
    StorySelection,
    #[serde(rename_all = "camelCase")]
    StoryView { story_title: String },
}

impl FlowScreen {
    pub fn name(&self) -> &'static str {
        match self {
            FlowScreen::Quiz { .. } => "quiz",
            FlowScreen::Result => "result",
            FlowScreen::StorySelection => "storySelection",
            FlowScreen::StoryView { .. } => "storyView",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {action} from the {screen} screen")]
    InvalidTransition { action: &'static str, screen: &'static str },
    #[error("step {step} is not answered yet")]
    StepIncomplete { step: u8 },
    #[error(transparent)]
    InvalidCharacter(#[from] CharacterValidationError),
    #[error("the quiz has not produced a character yet")]
    MissingCharacter,
    #[error("a story title is required")]
    MissingTitle,
}

/// Client-side progress through character creation: quiz, result, story
/// selection and story view. Failed transitions leave the flow untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationFlow {
    screen: FlowScreen,
    draft: CharacterDraft,
    character: Option<Character>,
}

impl Default for CreationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CreationFlow {
    pub fn new() -> Self {
        Self {
            screen: FlowScreen::Quiz { step_index: 0 },
            draft: CharacterDraft::default(),
            character: None,
        }
    }

    pub fn screen(&self) -> &FlowScreen {
        &self.screen
    }

    pub fn draft(&self) -> &CharacterDraft {
        &self.draft
    }

    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    pub fn current_step(&self) -> Option<&'static QuizStep> {
        match self.screen {
            FlowScreen::Quiz { step_index } => QUIZ_STEPS.get(step_index),
            _ => None,
        }
    }

    fn invalid(&self, action: &'static str) -> FlowError {
        FlowError::InvalidTransition { action, screen: self.screen.name() }
    }

    /// Records the answer for the current quiz step.
    pub fn answer(&mut self, value: QuizValue) -> Result<(), FlowError> {
        let step = self.current_step().ok_or_else(|| self.invalid("answer"))?;
        self.draft.set_field(step.field, value);
        Ok(())
    }

    /// Advances the quiz. On the last step the draft is validated; a valid
    /// draft becomes the returned character and the flow moves to `Result`.
    pub fn next(&mut self) -> Result<Option<Character>, FlowError> {
        let FlowScreen::Quiz { step_index } = self.screen else {
            return Err(self.invalid("advance"));
        };
        let step = &QUIZ_STEPS[step_index];
        if !step.accepts(self.draft.field_value(step.field).as_ref()) {
            return Err(FlowError::StepIncomplete { step: step.id });
        }

        if step_index + 1 < QUIZ_STEPS.len() {
            self.screen = FlowScreen::Quiz { step_index: step_index + 1 };
            return Ok(None);
        }

        let character = self.draft.clone().into_character(None)?;
        self.character = Some(character.clone());
        self.screen = FlowScreen::Result;
        Ok(Some(character))
    }

    /// Goes back one quiz step; a no-op on the first step.
    pub fn previous(&mut self) -> Result<(), FlowError> {
        let FlowScreen::Quiz { step_index } = self.screen else {
            return Err(self.invalid("go back"));
        };
        self.screen = FlowScreen::Quiz { step_index: step_index.saturating_sub(1) };
        Ok(())
    }

    pub fn restart(&mut self) {
        *self = Self::new();
    }

    pub fn create_story(&mut self) -> Result<(), FlowError> {
        if self.screen != FlowScreen::Result {
            return Err(self.invalid("create a story"));
        }
        self.screen = FlowScreen::StorySelection;
        Ok(())
    }

    pub fn select_story(&mut self, title: &str) -> Result<(), FlowError> {
        if self.screen != FlowScreen::StorySelection {
            return Err(self.invalid("select a story"));
        }
        if title.trim().is_empty() {
            return Err(FlowError::MissingTitle);
        }
        if self.character.is_none() {
            return Err(FlowError::MissingCharacter);
        }
        self.screen = FlowScreen::StoryView { story_title: title.trim().to_string() };
        Ok(())
    }

    pub fn back_to_result(&mut self) -> Result<(), FlowError> {
        match self.screen {
            FlowScreen::StorySelection | FlowScreen::StoryView { .. } => {
                self.screen = FlowScreen::Result;
                Ok(())
            }
            _ => Err(self.invalid("return to the result")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWERS: [&str; 7] = [
        "Luna", "7", "Feminino", "Pele Morena", "Preto", "Castanhos", "Cacheado e Longo",
    ];

    fn finished_quiz() -> CreationFlow {
        let mut flow = CreationFlow::new();
        for answer in ANSWERS {
            flow.answer(answer.into()).unwrap();
            flow.next().unwrap();
        }
        flow
    }

    #[test]
    fn previous_on_first_step_is_a_noop() {
        let mut flow = CreationFlow::new();
        flow.previous().unwrap();
        assert_eq!(flow.screen(), &FlowScreen::Quiz { step_index: 0 });
    }

    #[test]
    fn unanswered_step_blocks_next() {
        let mut flow = CreationFlow::new();
        assert_eq!(flow.next(), Err(FlowError::StepIncomplete { step: 1 }));
        assert_eq!(flow.screen(), &FlowScreen::Quiz { step_index: 0 });

        flow.answer("Luna".into()).unwrap();
        flow.next().unwrap();
        flow.answer(QuizValue::Number(0)).unwrap();
        assert_eq!(flow.next(), Err(FlowError::StepIncomplete { step: 2 }));
    }

    #[test]
    fn completing_the_quiz_yields_a_character() {
        let mut flow = CreationFlow::new();
        let mut finished = None;
        for answer in ANSWERS {
            flow.answer(answer.into()).unwrap();
            finished = flow.next().unwrap();
        }
        let character = finished.expect("last step returns the character");
        assert_eq!(character.name, "Luna");
        assert_eq!(character.age, 7);
        assert_eq!(flow.screen(), &FlowScreen::Result);
    }

    #[test]
    fn invalid_draft_stays_on_the_last_step() {
        let mut flow = CreationFlow::new();
        for (index, answer) in ANSWERS.iter().enumerate() {
            let value = if index == 1 { QuizValue::Number(150) } else { (*answer).into() };
            flow.answer(value).unwrap();
            if index + 1 < ANSWERS.len() {
                assert_eq!(flow.next(), Ok(None));
            }
        }

        let err = flow.next().unwrap_err();
        let FlowError::InvalidCharacter(errors) = err else {
            panic!("expected a validation error, got {err:?}");
        };
        assert_eq!(errors.errors(), ["Valid age is required (1-100)".to_string()]);
        assert_eq!(flow.screen(), &FlowScreen::Quiz { step_index: 6 });
        assert!(flow.character().is_none());
    }

    #[test]
    fn full_walk_through_story_screens() {
        let mut flow = finished_quiz();
        flow.create_story().unwrap();
        assert_eq!(flow.screen(), &FlowScreen::StorySelection);

        assert_eq!(flow.select_story("  "), Err(FlowError::MissingTitle));
        flow.select_story("A Floresta Encantada").unwrap();
        assert_eq!(
            flow.screen(),
            &FlowScreen::StoryView { story_title: "A Floresta Encantada".to_string() }
        );

        flow.back_to_result().unwrap();
        assert_eq!(flow.screen(), &FlowScreen::Result);

        flow.restart();
        assert_eq!(flow, CreationFlow::new());
    }

    #[test]
    fn illegal_transitions_leave_state_unchanged() {
        let mut flow = CreationFlow::new();
        assert!(matches!(flow.create_story(), Err(FlowError::InvalidTransition { .. })));
        assert!(matches!(flow.back_to_result(), Err(FlowError::InvalidTransition { .. })));
        assert_eq!(flow.screen(), &FlowScreen::Quiz { step_index: 0 });

        let mut flow = finished_quiz();
        assert!(matches!(flow.next(), Err(FlowError::InvalidTransition { .. })));
        assert!(matches!(flow.answer("x".into()), Err(FlowError::InvalidTransition { .. })));
        assert_eq!(flow.screen(), &FlowScreen::Result);
    }

    #[test]
    fn screen_serializes_with_a_tag() {
        let json = serde_json::to_value(FlowScreen::Quiz { step_index: 2 }).unwrap();
        assert_eq!(json, serde_json::json!({ "screen": "quiz", "stepIndex": 2 }));
    }
}
