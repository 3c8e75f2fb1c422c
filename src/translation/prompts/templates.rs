/*!
 * Prompt templates for English to Chinese sentence translation.
 */

/// Instruction template with `{persona}`, `{context}` and `{sentence}` placeholders.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// The default translator instruction.
    pub const SENTENCE_TRANSLATOR: &'static str = "你是一名翻译专家。请保留原文的思想内涵和语义逻辑，使用地道流畅简洁的语言表达，可以意译，避免生硬翻译。人名和地名等专有名词不要翻译。{persona}{context}请将下面这句英文翻译为中文，请直接告诉我翻译结果，不要添加任何补充说明。：{sentence}";

    /// Create a new prompt template.
    pub fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
        }
    }

    pub fn sentence_translator() -> Self {
        Self::new(Self::SENTENCE_TRANSLATOR)
    }

    /// Render the template with the given parts.
    pub fn render(&self, persona: &str, context: &str, sentence: &str) -> String {
        self.template
            .replace("{persona}", persona)
            .replace("{context}", context)
            .replace("{sentence}", sentence)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::sentence_translator()
    }
}

/// Builds the prompt for one sentence.
#[derive(Debug, Clone, Default)]
pub struct TranslationPromptBuilder {
    template: PromptTemplate,
    persona: Option<String>,
    context: Vec<String>,
}

impl TranslationPromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Domain persona, e.g. "你是一名芯片专家"; blank personas are ignored.
    pub fn with_persona(mut self, persona: &str) -> Self {
        let persona = persona.trim().trim_end_matches('。');
        self.persona = (!persona.is_empty()).then(|| persona.to_string());
        self
    }

    /// Preceding sentences, sent as context only.
    pub fn with_context<S: AsRef<str>>(mut self, sentences: &[S]) -> Self {
        self.context = sentences.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Render the prompt for `sentence`.
    pub fn build(&self, sentence: &str) -> String {
        let persona = self
            .persona
            .as_ref()
            .map(|p| format!("{}。", p))
            .unwrap_or_default();

        let window = self.context.join(" ").replace('\n', " ");
        let context = if window.trim().is_empty() {
            String::new()
        } else {
            format!("这是前文，翻译结果中不要包含它的翻译：{}。", window.trim())
        };

        self.template.render(&persona, &context, sentence.trim())
    }
}
