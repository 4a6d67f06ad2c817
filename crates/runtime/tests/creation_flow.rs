use storytime_runtime::{
    prompts, translate, CreationFlow, FlowError, FlowScreen, Gender, QuizStepKind, QuizValue, QUIZ_STEPS,
};

fn answer_for(step_index: usize) -> QuizValue {
    let step = &QUIZ_STEPS[step_index];
    match step.kind {
        QuizStepKind::Text => "Maya".into(),
        QuizStepKind::Number => QuizValue::Number(6),
        QuizStepKind::Select => step.options[step.options.len() - 1].into(),
    }
}

#[test]
fn quiz_to_story_view() {
    let mut flow = CreationFlow::new();
    let mut character = None;

    for step_index in 0..QUIZ_STEPS.len() {
        assert_eq!(flow.screen(), &FlowScreen::Quiz { step_index });
        flow.answer(answer_for(step_index)).unwrap();
        character = flow.next().unwrap();
    }

    let character = character.expect("quiz completion returns the character");
    assert_eq!(character.gender, Gender::Other);
    assert_eq!(character.hair_style, "Spikes (Fantasia)");
    assert_eq!(flow.screen(), &FlowScreen::Result);

    let prompt = prompts::portrait_prompt(&character);
    assert!(prompt.contains(&translate("Spikes (Fantasia)")));
    assert!(prompt.contains("Non-binary"));

    flow.create_story().unwrap();
    flow.select_story("O Segredo da Montanha").unwrap();
    assert!(matches!(flow.screen(), FlowScreen::StoryView { story_title } if story_title == "O Segredo da Montanha"));
}

#[test]
fn going_back_keeps_answers() {
    let mut flow = CreationFlow::new();
    flow.answer("Maya".into()).unwrap();
    flow.next().unwrap();
    flow.previous().unwrap();
    assert_eq!(flow.screen(), &FlowScreen::Quiz { step_index: 0 });
    assert_eq!(flow.draft().name.as_deref(), Some("Maya"));

    // answers survive, so the step can be left again straight away
    flow.next().unwrap();
    assert_eq!(flow.next(), Err(FlowError::StepIncomplete { step: 2 }));
}
