//! Quiz settings, the rendered question set, and local grading.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::alerts::{AlertCenter, Severity};
use crate::api::types::{Question, Quiz, QuizRequest};
use crate::error::{ClientError, Result};

pub const NO_QUESTIONS_MESSAGE: &str = "No questions were generated. Try different settings.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    ShortAnswer,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple_choice",
            QuestionType::TrueFalse => "true_false",
            QuestionType::ShortAnswer => "short_answer",
        }
    }

    pub fn all() -> Vec<QuestionType> {
        vec![
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
            QuestionType::ShortAnswer,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple choice",
            QuestionType::TrueFalse => "True / False",
            QuestionType::ShortAnswer => "Short answer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }
}

/// Standard quizzes draw from the whole of the selected documents; topic
/// quizzes stay within a named topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizMode {
    #[default]
    Standard,
    Topic,
}

impl QuizMode {
    pub fn endpoint(&self) -> &'static str {
        match self {
            QuizMode::Standard => "/api/quiz/generate",
            QuizMode::Topic => "/api/quiz/generate/topic",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            QuizMode::Standard => "Standard",
            QuizMode::Topic => "Topic-specific",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            QuizMode::Standard => QuizMode::Topic,
            QuizMode::Topic => QuizMode::Standard,
        }
    }
}

/// The quiz generation form.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    pub mode: QuizMode,
    pub difficulty: Difficulty,
    pub num_questions: u32,
    pub question_types: Vec<QuestionType>,
    pub topic: String,
    pub busy: bool,
}

impl QuizSettings {
    pub const MIN_QUESTIONS: u32 = 1;
    pub const MAX_QUESTIONS: u32 = 20;

    pub fn new() -> Self {
        Self {
            mode: QuizMode::Standard,
            difficulty: Difficulty::Medium,
            num_questions: 5,
            question_types: vec![QuestionType::MultipleChoice, QuestionType::TrueFalse],
            topic: String::new(),
            busy: false,
        }
    }

    pub fn toggle_question_type(&mut self, kind: QuestionType) {
        if let Some(pos) = self.question_types.iter().position(|k| *k == kind) {
            self.question_types.remove(pos);
        } else {
            self.question_types.push(kind);
        }
    }

    pub fn has_question_type(&self, kind: QuestionType) -> bool {
        self.question_types.contains(&kind)
    }

    pub fn increase_questions(&mut self) {
        self.num_questions = (self.num_questions + 1).min(Self::MAX_QUESTIONS);
    }

    pub fn decrease_questions(&mut self) {
        self.num_questions = self.num_questions.saturating_sub(1).max(Self::MIN_QUESTIONS);
    }

    pub fn submit_label(&self) -> &'static str {
        if self.busy {
            "Generating Quiz..."
        } else {
            "Generate Quiz"
        }
    }

    /// Validates the form in the order the user fills it in. Question types
    /// keep the order of `QuestionType::all`.
    pub fn build_request(&self, document_ids: &[String]) -> Result<QuizRequest> {
        if document_ids.is_empty() {
            return Err(ClientError::validation("Please select at least one document"));
        }
        if self.question_types.is_empty() {
            return Err(ClientError::validation(
                "Please select at least one question type",
            ));
        }

        let topic = match self.mode {
            QuizMode::Standard => None,
            QuizMode::Topic => {
                let topic = self.topic.trim();
                if topic.is_empty() {
                    return Err(ClientError::validation("Please enter a topic"));
                }
                Some(topic.to_string())
            }
        };

        let question_types = QuestionType::all()
            .into_iter()
            .filter(|k| self.has_question_type(*k))
            .collect();

        Ok(QuizRequest {
            document_ids: document_ids.to_vec(),
            num_questions: self.num_questions,
            question_types,
            difficulty: self.difficulty,
            topic,
        })
    }

    /// Like `build_request`, but reports a rejected form as a warning alert.
    pub fn prepare(&self, document_ids: &[String], alerts: &mut AlertCenter) -> Option<QuizRequest> {
        match self.build_request(document_ids) {
            Ok(request) => Some(request),
            Err(e) => {
                alerts.show(e.to_string(), Severity::Warning);
                None
            }
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerWidget {
    Choice(Vec<String>),
    Text,
}

impl AnswerWidget {
    pub fn for_question(question: &Question) -> Self {
        let options = question.options.clone().unwrap_or_default();
        match question.kind.as_deref() {
            Some("multiple_choice") => AnswerWidget::Choice(options),
            _ if !options.is_empty() => AnswerWidget::Choice(options),
            Some("true_false") => AnswerWidget::Choice(vec!["True".to_string(), "False".to_string()]),
            _ => AnswerWidget::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub correct: bool,
    pub correct_answer: String,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QuestionCard {
    pub prompt: String,
    pub widget: AnswerWidget,
    pub selected_option: Option<usize>,
    pub text_answer: String,
    pub result: Option<QuestionResult>,
    // Hidden until graded
    answer: String,
    explanation: String,
}

impl QuestionCard {
    fn new(index: usize, question: &Question) -> Self {
        Self {
            prompt: format!("{}. {}", index + 1, question.question),
            widget: AnswerWidget::for_question(question),
            selected_option: None,
            text_answer: String::new(),
            result: None,
            answer: question.answer.clone(),
            explanation: question.explanation.clone().unwrap_or_default(),
        }
    }

    pub fn user_answer(&self) -> String {
        match &self.widget {
            AnswerWidget::Choice(options) => self
                .selected_option
                .and_then(|i| options.get(i))
                .cloned()
                .unwrap_or_default(),
            AnswerWidget::Text => self.text_answer.trim().to_string(),
        }
    }

    pub fn option_count(&self) -> usize {
        match &self.widget {
            AnswerWidget::Choice(options) => options.len(),
            AnswerWidget::Text => 0,
        }
    }

    fn grade(&mut self) -> bool {
        let correct = self.user_answer().to_lowercase() == self.answer.to_lowercase();
        self.result = Some(QuestionResult {
            correct,
            correct_answer: self.answer.clone(),
            explanation: if self.explanation.is_empty() {
                None
            } else {
                Some(self.explanation.clone())
            },
        });
        correct
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTier {
    Excellent,
    Good,
    KeepPracticing,
}

impl FeedbackTier {
    pub fn for_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            FeedbackTier::Excellent
        } else if percentage >= 60.0 {
            FeedbackTier::Good
        } else {
            FeedbackTier::KeepPracticing
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "Excellent job! 🎉",
            FeedbackTier::Good => "Good work! Keep studying! 👍",
            FeedbackTier::KeepPracticing => "Keep practicing! You'll improve with more study. 📚",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            FeedbackTier::Excellent => Severity::Success,
            FeedbackTier::Good => Severity::Info,
            FeedbackTier::KeepPracticing => Severity::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    pub total: usize,
    pub correct: usize,
    /// Rounded to one decimal place.
    pub percentage: f64,
    pub tier: FeedbackTier,
}

impl ScoreReport {
    pub fn new(correct: usize, total: usize) -> Self {
        let raw = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        Self {
            total,
            correct,
            percentage: (raw * 10.0).round() / 10.0,
            tier: FeedbackTier::for_percentage(raw),
        }
    }
}

/// A rendered quiz: what the user sees and answers.
#[derive(Debug, Clone)]
pub struct QuizView {
    pub title: String,
    pub difficulty: String,
    pub cards: Vec<QuestionCard>,
    pub score: Option<ScoreReport>,
}

impl QuizView {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        let title = match quiz.topic.as_deref() {
            Some(topic) if !topic.is_empty() => format!("Quiz on {}", topic),
            _ => "Quiz".to_string(),
        };
        Self {
            title,
            difficulty: capitalize(&quiz.difficulty),
            cards: quiz
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| QuestionCard::new(i, q))
                .collect(),
            score: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }

    pub fn select_option(&mut self, card: usize, option: usize) {
        if self.is_graded() {
            return;
        }
        if let Some(c) = self.cards.get_mut(card) {
            if option < c.option_count() {
                c.selected_option = Some(option);
            }
        }
    }

    pub fn set_text_answer(&mut self, card: usize, text: &str) {
        if self.is_graded() {
            return;
        }
        if let Some(c) = self.cards.get_mut(card) {
            if c.widget == AnswerWidget::Text {
                c.text_answer = text.to_string();
            }
        }
    }

    /// Grades every card once. Returns `None` when already graded or empty.
    pub fn grade(&mut self) -> Option<&ScoreReport> {
        if self.is_graded() || self.cards.is_empty() {
            return None;
        }
        let correct = self
            .cards
            .iter_mut()
            .map(|c| c.grade())
            .filter(|ok| *ok)
            .count();
        let report = ScoreReport::new(correct, self.cards.len());
        info!(
            correct = report.correct,
            total = report.total,
            percentage = report.percentage,
            "quiz graded"
        );
        self.score = Some(report);
        self.score.as_ref()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
