use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// What a finished (or partly finished) quest is summarised as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareSummary {
    pub score: u32,
    pub total_score: u32,
    pub chapters_completed: usize,
    pub total_chapters: usize,
    pub display_name: String,
}

impl ShareSummary {
    /// Rounded share of the maximum score, 0 when there is nothing to score.
    pub fn percentage(&self) -> u32 {
        if self.total_score == 0 {
            return 0;
        }
        ((self.score as f64 / self.total_score as f64) * 100.0).round() as u32
    }

    fn badge(&self) -> &'static str {
        match self.percentage() {
            100.. => "🥷✨",
            80..=99 => "🥷",
            _ => "⚔️",
        }
    }
}

pub fn share_text(summary: &ShareSummary, origin: &str) -> String {
    format!(
        "I just completed Injective Ninja Quest! {badge}\n\n\
         📊 Score: {score}/{total} ({percentage}%)\n\
         📚 Chapters: {completed}/{chapters}\n\
         🎓 Learned about Injective's Layer 1 blockchain\n\n\
         Join the quest: {origin}\n\n\
         #Injective #NinjaLabs #Web3 #DeFi",
        badge = summary.badge(),
        score = summary.score,
        total = summary.total_score,
        percentage = summary.percentage(),
        completed = summary.chapters_completed,
        chapters = summary.total_chapters,
    )
}

pub fn twitter_intent_url(summary: &ShareSummary, origin: &str) -> String {
    format!(
        "https://twitter.com/intent/tweet?text={}",
        encode_uri_component(&share_text(summary, origin))
    )
}

pub fn telegram_intent_url(summary: &ShareSummary, origin: &str) -> String {
    format!(
        "https://t.me/share/url?url={}&text={}",
        encode_uri_component(origin),
        encode_uri_component(&share_text(summary, origin))
    )
}

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

const CERTIFICATE_WIDTH: usize = 43;

fn boxed(content: &str) -> String {
    let padding = CERTIFICATE_WIDTH.saturating_sub(content.chars().count() + 2);
    format!("║  {content}{}║", " ".repeat(padding))
}

fn rule(left: char, right: char) -> String {
    format!("{left}{}{right}", "═".repeat(CERTIFICATE_WIDTH))
}

fn centered(content: &str) -> String {
    let length = content.chars().count();
    let left = CERTIFICATE_WIDTH.saturating_sub(length) / 2;
    let right = CERTIFICATE_WIDTH.saturating_sub(length + left);
    format!("║{}{content}{}║", " ".repeat(left), " ".repeat(right))
}

/// Plain-text certificate framed with box-drawing characters.
pub fn certificate_text(summary: &ShareSummary) -> String {
    let lines = [
        rule('╔', '╗'),
        centered("INJECTIVE NINJA QUEST CERTIFICATE"),
        rule('╠', '╣'),
        boxed(""),
        boxed(&format!("Ninja: {}", summary.display_name)),
        boxed(&format!(
            "Score: {}/{} ({}%)",
            summary.score,
            summary.total_score,
            summary.percentage()
        )),
        boxed(&format!(
            "Chapters Completed: {}/{}",
            summary.chapters_completed, summary.total_chapters
        )),
        boxed(""),
        boxed("You have mastered the fundamentals of"),
        boxed("Injective's Layer 1 blockchain!"),
        boxed(""),
        rule('╠', '╣'),
        centered("Ninja Labs Community"),
        rule('╚', '╝'),
    ];

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

pub const CERTIFICATE_IMAGE_WIDTH: u32 = 1200;
pub const CERTIFICATE_IMAGE_HEIGHT: u32 = 800;

/// One centred line of text painted onto the image certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateLine {
    pub text: String,
    /// CSS font shorthand, e.g. `bold 64px Arial`.
    pub font: &'static str,
    pub color: &'static str,
    /// Baseline, in pixels from the top.
    pub y: f64,
}

fn line(
    text: impl Into<String>,
    font: &'static str,
    color: &'static str,
    y: f64,
) -> CertificateLine {
    CertificateLine {
        text: text.into(),
        font,
        color,
        y,
    }
}

/// Text lines of the PNG certificate, top to bottom.
pub fn certificate_layout(summary: &ShareSummary) -> Vec<CertificateLine> {
    let score_color = if summary.percentage() == 100 {
        "#4ade80"
    } else {
        "#4facfe"
    };

    vec![
        line("INJECTIVE NINJA QUEST", "bold 64px Arial", "#00f2fe", 150.0),
        line("Certificate of Completion", "32px Arial", "#4facfe", 200.0),
        line("🥷", "80px Arial", "#4facfe", 300.0),
        line(
            format!("Ninja: {}", summary.display_name),
            "bold 36px Arial",
            "#ffffff",
            400.0,
        ),
        line(
            format!(
                "Score: {}/{} ({}%)",
                summary.score,
                summary.total_score,
                summary.percentage()
            ),
            "bold 48px Arial",
            score_color,
            480.0,
        ),
        line(
            format!(
                "Chapters Completed: {}/{}",
                summary.chapters_completed, summary.total_chapters
            ),
            "32px Arial",
            "#ffffff",
            540.0,
        ),
        line(
            "You have mastered the fundamentals of",
            "italic 28px Arial",
            "#4facfe",
            620.0,
        ),
        line(
            "Injective's Layer 1 blockchain!",
            "italic 28px Arial",
            "#4facfe",
            660.0,
        ),
        line("🥷 Ninja Labs Community", "bold 24px Arial", "#00f2fe", 740.0),
    ]
}

pub fn certificate_file_name(timestamp_ms: u64, extension: &str) -> String {
    format!("injective-ninja-certificate-{timestamp_ms}.{extension}")
}
