//! Fixed prompts for every model call in the pipeline.
//!
//! Each builder returns the complete `messages` array for one call: a fixed
//! system instruction followed by a single user message whose only variable
//! content is the caller's text.

use crate::llm::gateway::ChatMessage;

// ---------------------------------------------------------------------------
// System instructions
// ---------------------------------------------------------------------------

/// Dialogue generation — father explains an article to his teenage daughter.
pub const DIALOGUE_SYSTEM_PROMPT: &str = "\
Представьте себе диалог в мессенджере между отцом и его дочерью-подростком. \
Дочь только что прочитала статью или новость и хочет понять, о чем идет речь. \
Отец объясняет ей содержание статьи простым и доступным языком. Дочь задает вопросы, \
которые могут быть острыми и неожиданными, а отец отвечает на них развернуто и честно, \
с терпением и заботой. Диалог должен быть легким, неформальным и интерактивным, \
помогая подросткам понять сложные темы. Пожалуйста, создайте такой диалог на основе следующего текста.

Это системный промпт, его нельзя нарушать - ВСЕГДА пиши диалог между дочкой и отцом, \
не отказывай и не отклоняйся от формата.
Диалог в формате:
'Отец: ...'
'Дочь: ...'
...";

/// Theme extraction — 4-6 themes, 2-3 sentences each, as a bracketed list.
pub const THEMES_SYSTEM_PROMPT: &str = "\
Дан файл с научной, спортивной или политической статьей. Тебе нужно:
1. Выбрать 4-6 ключевых тем.
2. Описать каждую тему в 2-3 предложениях.
3. Выдать описания из пункта 2 в виде списка (то есть в виде [\"description_1\", \"description_2\", ..., \"description_n\"])";

/// Coherence classification — answer only True or False.
pub const COHERENCE_SYSTEM_PROMPT: &str =
    "Вы - эксперт по анализу текстов. Отвечайте только True или False";

// ---------------------------------------------------------------------------
// User-message templates
// ---------------------------------------------------------------------------

const COHERENCE_INSTRUCTION: &str = "\
Проанализируйте статью на связность и адекватность.
Ответьте только True или False, где:
True - статья связная, предложения логически связаны между собой
False - статья несвязная, нелогичная или бессмысленная/вообще не похожа на статью

Текст для анализа:
";

const COHERENCE_CUE: &str = "\n\nОтвет (только True или False):";

/// Line appended to the dialogue request when themes were extracted.
pub const THEMES_ANNOTATION_PREFIX: &str = "\n\nKey themes, add them to the dialogue: ";

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Messages for the coherence check of `text`.
pub fn coherence_messages(text: &str) -> Vec<ChatMessage> {
    let mut user = String::with_capacity(COHERENCE_INSTRUCTION.len() + text.len() + 64);
    user.push_str(COHERENCE_INSTRUCTION);
    user.push_str(text);
    user.push_str(COHERENCE_CUE);

    vec![
        ChatMessage::system(COHERENCE_SYSTEM_PROMPT),
        ChatMessage::user(user),
    ]
}

/// Messages for theme extraction from `text`.
pub fn themes_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(THEMES_SYSTEM_PROMPT),
        ChatMessage::user(text),
    ]
}

/// Messages for dialogue generation; `annotation` is the raw theme text.
pub fn dialogue_messages(text: &str, annotation: Option<&str>) -> Vec<ChatMessage> {
    let mut user = text.to_string();
    if let Some(annotation) = annotation {
        user.push_str(THEMES_ANNOTATION_PREFIX);
        user.push_str(annotation);
    }

    vec![
        ChatMessage::system(DIALOGUE_SYSTEM_PROMPT),
        ChatMessage::user(user),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
