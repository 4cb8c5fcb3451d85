use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Interface language. The portal ships English and Bahasa Malaysia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Bm,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Bm => "bm",
        }
    }

    /// Pick the variant of a string pair for this language.
    pub fn pick<'a>(self, en: &'a str, bm: &'a str) -> &'a str {
        match self {
            Language::En => en,
            Language::Bm => bm,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "bm" | "ms" | "malay" => Ok(Language::Bm),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

// ============================================================================
// CHAT STRINGS
// ============================================================================

pub fn welcome(lang: Language) -> &'static str {
    lang.pick(
        "Hello! I'm Aiva. I'll help you with any questions about UMSKAL. How can I assist you today?",
        "Helo! Saya Aiva. Saya akan membantu anda dengan sebarang soalan tentang sistem maklum balas UMSKAL. Bagaimana saya boleh membantu anda hari ini?",
    )
}

pub fn sensitive_topic_refusal(lang: Language) -> &'static str {
    lang.pick(
        "I appreciate your question, but I cannot discuss sensitive topics such as politics, religion, or race. I'm here to help with questions about UMSKAL and our feedback system. Is there anything else I can help you with?",
        "Maaf, saya tidak boleh menjawab pertanyaan tentang topik sensitif seperti politik, agama, atau perkauman. Saya di sini untuk membantu dengan pertanyaan tentang UMSKAL dan sistem maklum balas. Bolehkah saya membantu anda dengan sesuatu yang lain?",
    )
}

pub fn technical_difficulties(lang: Language) -> &'static str {
    lang.pick(
        "Sorry, I'm experiencing technical difficulties. Please try again.",
        "Maaf, saya mengalami masalah teknikal. Sila cuba lagi.",
    )
}

pub fn session_registered(_lang: Language) -> &'static str {
    "New chat session started"
}

pub fn confirm_delete_chat(lang: Language) -> &'static str {
    lang.pick(
        "Are you sure you want to delete this chat?",
        "Adakah anda pasti ingin memadam sembang ini?",
    )
}

pub fn delete_chat_failed(lang: Language) -> &'static str {
    lang.pick(
        "Failed to delete chat. Please try again.",
        "Gagal memadam sembang. Sila cuba lagi.",
    )
}

pub fn cooldown_notice(lang: Language, seconds: u64) -> String {
    match lang {
        Language::En => format!("Please wait {} seconds before sending another message.", seconds),
        Language::Bm => format!("Sila tunggu {} saat sebelum menghantar mesej lain.", seconds),
    }
}

// ============================================================================
// FEEDBACK DIALOGUE STRINGS
// ============================================================================

/// Fixed prompts of the feedback-collection dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Greeting,
    CategorySelected,
    Confirm,
    Appreciative,
    EnterCategory,
    Submitting,
    Error,
    SignInRequired,
    SignInFirst,
}

impl Prompt {
    pub fn text(self, lang: Language) -> &'static str {
        match self {
            Prompt::Greeting => lang.pick(
                "Great! I can help you submit feedback. Please choose a category:",
                "Sempurna! Saya boleh membantu anda menyerahkan maklum balas. Sila pilih kategori:",
            ),
            Prompt::CategorySelected => lang.pick(
                "Now please describe your feedback in detail.",
                "Sila terangkan maklum balas anda secara terperinci.",
            ),
            Prompt::Confirm => lang.pick(
                "Thank you for your feedback! Your reference number is: ",
                "Terima kasih atas maklum balas anda! Nombor rujukan anda ialah: ",
            ),
            Prompt::Appreciative => lang.pick("We appreciate your input.", "Kami menghargai input anda."),
            Prompt::EnterCategory => lang.pick("Enter category number", "Masukkan nombor kategori"),
            Prompt::Submitting => lang.pick("Submitting...", "Menghantar..."),
            Prompt::Error => lang.pick(
                "Error submitting feedback. Please try again.",
                "Ralat menghantar maklum balas. Sila cuba lagi.",
            ),
            Prompt::SignInRequired => lang.pick(
                "It seems like you aren't signed in. Please sign in to use this feature.",
                "Nampaknya anda belum masuk. Sila masuk untuk menggunakan ciri ini.",
            ),
            Prompt::SignInFirst => lang.pick("Please sign in first", "Sila masuk terlebih dahulu"),
        }
    }
}

pub fn invalid_selection(lang: Language, count: usize) -> String {
    match lang {
        Language::En => format!("Invalid selection. Please enter a number between 1 and {}.", count),
        Language::Bm => format!("Pilihan tidak sah. Sila masukkan nombor antara 1 dan {}.", count),
    }
}

pub fn enter_category_placeholder(lang: Language, count: usize) -> String {
    format!("{} (1-{})...", Prompt::EnterCategory.text(lang), count)
}

pub fn feedback_summary(lang: Language, category_label: &str, content: &str) -> String {
    match lang {
        Language::En => format!(
            "Thank you for your feedback:\n\nCategory: {}\nFeedback: \"{}\"\n\n{}",
            category_label,
            content,
            Prompt::Submitting.text(lang)
        ),
        Language::Bm => format!(
            "Terima kasih atas maklum balas anda:\n\nKategori: {}\nMaklum balas: \"{}\"\n\n{}",
            category_label,
            content,
            Prompt::Submitting.text(lang)
        ),
    }
}

pub fn feedback_form_result(lang: Language, success: bool) -> &'static str {
    if success {
        lang.pick(
            "Your feedback has been submitted successfully! Thank you.",
            "Maklum balas anda telah berjaya dihantar! Terima kasih.",
        )
    } else {
        Prompt::Error.text(lang)
    }
}

pub fn display_name_updated(lang: Language) -> &'static str {
    lang.pick(
        "Display name updated successfully.",
        "Nama paparan telah berjaya dikemas kini.",
    )
}
