//! Quest regions: active list, completed list, quest detail
//!
//! Cards and buttons carry `data-qindex` / `data-tindex` /
//! `data-questionidx` attributes holding indices into the current quest
//! list. Surfaces read them back to build [`UiEvent`](crate::events::UiEvent)s.

use std::fmt::Write;

use super::html::escape;
use crate::model::{Quest, QuizState, SubTask, UserState};

const ACTIVE_EMPTY: &str = concat!(
    r#"<div class="empty-state text-center p-5 mt-4">"#,
    r#"<img src="/static/img/IMG_8435.PNG" alt="Sleeping Mascot" width="100" class="mb-3">"#,
    r#"<h5 class="fw-bold">The opossum is playing dead...</h5>"#,
    r#"<p class="text-muted small mb-0 fw-semibold">No active quests found. Enter a quick goal above to wake him up and earn XP!</p>"#,
    r#"</div>"#,
);

const COMPLETED_EMPTY: &str = concat!(
    r#"<div class="empty-state text-center p-5 mt-4">"#,
    r#"<h6 class="fw-bold">No Records</h6>"#,
    r#"<p class="text-muted small mb-0 fw-semibold">No completed objectives found in the databanks.</p>"#,
    r#"</div>"#,
);

fn quest_card(out: &mut String, index: usize, quest: &Quest) {
    let progress = quest.progress();
    let _ = write!(
        out,
        concat!(
            r#"<div class="quest-card p-3 mb-2 shadow-sm rounded-3 border" data-qindex="{index}">"#,
            r#"<div class="d-flex justify-content-between align-items-center mb-2">"#,
            r#"<h6 class="fw-bold mb-0 text-dark">{title}</h6>"#,
            r#"<span class="badge">{difficulty}</span>"#,
            r#"</div>"#,
            r#"<div class="progress mt-2 border"><div class="progress-bar" role="progressbar" style="width: {progress}%;"></div></div>"#,
            r#"<div class="d-flex justify-content-between mt-2 small text-muted">"#,
            r#"<span>{done}/{total} Tasks</span><span class="fw-bold">{progress}%</span>"#,
            r#"</div></div>"#,
        ),
        index = index,
        title = escape(&quest.title),
        difficulty = escape(&quest.difficulty),
        progress = progress,
        done = quest.completed_count(),
        total = quest.sub_tasks.len(),
    );
}

/// Quests still in progress; an empty-state panel when there are none
pub fn render_active_quests(state: &UserState) -> String {
    let mut out = String::new();
    for (index, quest) in state.active_quests() {
        quest_card(&mut out, index, quest);
    }
    if out.is_empty() {
        return ACTIVE_EMPTY.to_string();
    }
    out
}

/// Finished quests for the profile; an empty-state panel when there are none
pub fn render_completed_quests(state: &UserState) -> String {
    let mut out = String::new();
    for (index, quest) in state.completed_quests() {
        quest_card(&mut out, index, quest);
    }
    if out.is_empty() {
        return COMPLETED_EMPTY.to_string();
    }
    out
}

/// Detail view of one quest; `None` if the index is out of range
pub fn render_quest_detail(state: &UserState, index: usize) -> Option<String> {
    let quest = state.quests.get(index)?;
    let progress = quest.progress();

    let mut out = String::new();
    let _ = write!(
        out,
        concat!(
            r#"<div class="quest-detail-header">"#,
            r#"<h5 id="questModalTitle">{title}</h5>"#,
            r#"<span id="questModalDifficulty">{difficulty}</span>"#,
            r#"<span id="questProgressText">{progress}% Completed</span>"#,
            r#"<div class="progress"><div class="progress-bar" id="questModalProgress" style="width: {progress}%;"></div></div>"#,
            r#"</div>"#,
        ),
        title = escape(&quest.title),
        difficulty = escape(&quest.difficulty),
        progress = progress,
    );

    for (t, task) in quest.sub_tasks.iter().enumerate() {
        sub_task_item(&mut out, index, t, task);
    }
    Some(out)
}

fn sub_task_item(out: &mut String, q: usize, t: usize, task: &SubTask) {
    let _ = write!(
        out,
        r#"<div class="quest-chain-item{done}">"#,
        done = if task.completed { " completed" } else { "" }
    );

    let title_class = if task.completed {
        "text-decoration-line-through text-muted"
    } else {
        "text-dark"
    };
    let _ = write!(
        out,
        concat!(
            r#"<div class="d-flex justify-content-between align-items-center quest-accordion-toggle">"#,
            r#"<div><h6 class="fw-bold mb-1 {title_class}">{task}</h6>"#,
            r#"<small class="text-muted fw-bold">+{xp} XP • Tap to expand</small></div>"#,
        ),
        title_class = title_class,
        task = escape(&task.task),
        xp = task.reward(),
    );
    if task.completed {
        out.push_str(r#"<span class="text-success fw-bold">✓ Done</span>"#);
    } else {
        let _ = write!(
            out,
            r#"<button class="btn btn-sm rounded-pill px-3 btn-complete-task fw-bold" data-qindex="{q}" data-tindex="{t}">Complete</button>"#
        );
    }
    out.push_str(r#"</div><div class="quest-accordion-body">"#);

    if let Some(description) = &task.task_description {
        let _ = write!(
            out,
            r#"<p class="text-muted small mb-3 px-2 border-start border-primary border-3 ms-1">{}</p>"#,
            escape(description)
        );
    }

    match task.quiz_state() {
        QuizState::Attempted { score } => quiz_review(out, q, t, task, score),
        QuizState::Assigned => quiz_form(out, q, t, task),
        QuizState::None if !task.completed => {
            let _ = write!(
                out,
                concat!(
                    r#"<div class="text-center mt-3 pt-3 border-top">"#,
                    r#"<button class="btn btn-sm btn-outline-primary rounded-pill px-4 fw-bold btn-generate-quiz" data-qindex="{q}" data-tindex="{t}">Generate Mini-Test</button>"#,
                    r#"</div>"#,
                ),
                q = q,
                t = t,
            );
        }
        QuizState::None => {}
    }

    out.push_str("</div></div>");
}

fn quiz_form(out: &mut String, q: usize, t: usize, task: &SubTask) {
    let _ = write!(
        out,
        concat!(
            r#"<div class="quiz-container shadow-sm">"#,
            r#"<h6 class="fw-bold mb-3 text-primary text-center">AI generated Mini-Test</h6>"#,
            r#"<div id="quiz-form-{q}-{t}">"#,
        ),
        q = q,
        t = t,
    );

    for (n, question) in task.quiz_data.iter().flatten().enumerate() {
        let _ = write!(
            out,
            r#"<div class="mb-4 quiz-question"><div class="quiz-question-title">{}. {}</div><div class="quiz-options-list">"#,
            n + 1,
            escape(&question.question)
        );
        for (o, option) in question.options.iter().enumerate() {
            let _ = write!(
                out,
                concat!(
                    r#"<input type="radio" name="q-{q}-{t}-{n}" id="q-{q}-{t}-{n}-o-{o}" value="{o}" class="quiz-option-input d-none">"#,
                    r#"<label for="q-{q}-{t}-{n}-o-{o}" class="quiz-option-label">{option}</label>"#,
                ),
                q = q,
                t = t,
                n = n,
                o = o,
                option = escape(option),
            );
        }
        out.push_str("</div></div>");
    }

    let _ = write!(
        out,
        r#"<button class="btn btn-primary w-100 rounded-pill fw-bold mt-2 btn-submit-test" data-qindex="{q}" data-tindex="{t}">Submit Test</button></div></div>"#
    );
}

fn quiz_review(out: &mut String, q: usize, t: usize, task: &SubTask, score: u32) {
    let _ = write!(
        out,
        r#"<div class="quiz-container shadow-sm border-success"><h6 class="text-success fw-bold text-center mb-3">Quiz Completed! Score: {score}%</h6>"#
    );

    let answers = task.user_answers.as_deref().unwrap_or_default();
    for (n, question) in task.quiz_data.iter().flatten().enumerate() {
        let chosen = answers.get(n).copied();
        let _ = write!(
            out,
            r#"<div class="mb-4"><div class="quiz-question-title">{}. {}</div><div class="quiz-options-list">"#,
            n + 1,
            escape(&question.question)
        );
        for (o, option) in question.options.iter().enumerate() {
            let class = if o == question.correct_option_index {
                " correct-answer"
            } else if Some(o) == chosen {
                " wrong-answer"
            } else {
                ""
            };
            let _ = write!(
                out,
                r#"<label class="quiz-option-label{class}"{checked}>{option}</label>"#,
                class = class,
                checked = if Some(o) == chosen { r#" data-checked="true""# } else { "" },
                option = escape(option),
            );
        }
        out.push_str("</div>");

        if chosen != Some(question.correct_option_index) {
            let _ = write!(
                out,
                r#"<button class="btn btn-sm btn-outline-primary mt-2 rounded-pill px-3 fw-bold btn-explain" data-qindex="{q}" data-tindex="{t}" data-questionidx="{n}">Explain Why</button>"#
            );
        }
        let _ = write!(
            out,
            r#"<div class="ai-explanation-box" id="explain-box-{q}-{t}-{n}"></div></div>"#
        );
    }

    let _ = write!(
        out,
        concat!(
            r#"<div class="text-center mt-3 border-top pt-3">"#,
            r#"<button class="btn btn-sm btn-outline-danger rounded-pill fw-bold px-4 btn-new-test" data-qindex="{q}" data-tindex="{t}">Generate New Test</button>"#,
            r#"</div></div>"#,
        ),
        q = q,
        t = t,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuizQuestion;

    fn state() -> UserState {
        UserState {
            quests: vec![
                Quest::new("Done <quest>", "Easy", [SubTask::new("a").done()]),
                Quest::new("Half", "Hard", [SubTask::new("a").done(), SubTask::new("b")]),
                Quest::new("Empty", "Easy", []),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_active_excludes_finished_quests() {
        let html = render_active_quests(&state());
        assert!(!html.contains("Done &lt;quest&gt;"));
        assert!(html.contains(r#"data-qindex="1""#));
        assert!(html.contains("1/2 Tasks"));
        assert!(html.contains("50%"));
        // Empty quests stay active at 0%
        assert!(html.contains(r#"data-qindex="2""#));
        assert!(html.contains("0/0 Tasks"));
    }

    #[test]
    fn test_completed_lists_only_finished_quests() {
        let html = render_completed_quests(&state());
        assert!(html.contains("Done &lt;quest&gt;"));
        assert!(html.contains(r#"data-qindex="0""#));
        assert!(!html.contains("Half"));
        assert!(!html.contains("Empty"));
    }

    #[test]
    fn test_empty_states() {
        let empty = UserState::default();
        assert!(render_active_quests(&empty).contains("playing dead"));
        assert!(render_completed_quests(&empty).contains("No Records"));

        let all_done = UserState {
            quests: vec![Quest::new("x", "Easy", [SubTask::new("a").done()])],
            ..Default::default()
        };
        assert!(render_active_quests(&all_done).contains("playing dead"));
    }

    #[test]
    fn test_detail_quiz_lifecycle() {
        let mut state = state();
        assert!(render_quest_detail(&state, 9).is_none());

        let html = render_quest_detail(&state, 1).unwrap();
        assert!(html.contains("50% Completed"));
        assert!(html.contains("✓ Done"));
        assert!(html.contains(r#"btn-complete-task fw-bold" data-qindex="1" data-tindex="1""#));
        assert!(html.contains("btn-generate-quiz"));

        let task = &mut state.quests[1].sub_tasks[1];
        task.quiz_data = Some(vec![QuizQuestion {
            question: "2+2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_option_index: 1,
        }]);
        let html = render_quest_detail(&state, 1).unwrap();
        assert!(html.contains(r#"name="q-1-1-0""#));
        assert!(html.contains("btn-submit-test"));
        assert!(!html.contains("btn-generate-quiz"));

        let task = &mut state.quests[1].sub_tasks[1];
        task.quiz_score = Some(0);
        task.user_answers = Some(vec![0]);
        let html = render_quest_detail(&state, 1).unwrap();
        assert!(html.contains("Score: 0%"));
        assert!(html.contains("wrong-answer"));
        assert!(html.contains(r#"data-questionidx="0""#));
        assert!(html.contains(r#"id="explain-box-1-1-0""#));
        assert!(html.contains("btn-new-test"));
    }
}
