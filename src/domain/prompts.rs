//! Prompt templates for the generative backend.
//!
//! Report templates are selected by detected language through [`template_for`], which is
//! total: every language without a dedicated template gets the English one. Section
//! structure is a directive to the model only; responses are never parsed or validated.

/// Language used when detection fails or no template exists.
pub const FALLBACK_LANGUAGE: &str = "English";

/// Sent once at startup to check that the backend answers at all.
pub const CONNECTION_PROBE_PROMPT: &str = "Say 'Hello, I am working!' in exactly those words.";

const TRANSCRIPT_SLOT: &str = "{transcript}";

/// A report prompt template keyed by language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTemplate {
    English,
    Russian,
}

impl ReportTemplate {
    /// Fill the template with the rendered transcript.
    pub fn render(self, transcript: &str) -> String {
        self.body().replacen(TRANSCRIPT_SLOT, transcript, 1)
    }

    fn body(self) -> &'static str {
        match self {
            ReportTemplate::English => ENGLISH_REPORT,
            ReportTemplate::Russian => RUSSIAN_REPORT,
        }
    }
}

/// Template for a detected language name. Matching ignores case, surrounding whitespace,
/// quotes and trailing punctuation (models often answer `"Russian."`).
pub fn template_for(language: &str) -> ReportTemplate {
    match normalize_language(language).as_str() {
        "russian" | "русский" => ReportTemplate::Russian,
        _ => ReportTemplate::English,
    }
}

fn normalize_language(language: &str) -> String {
    language
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == '*')
        .trim()
        .to_lowercase()
}

/// Prompt asking the backend for the single dominant language of `sample`.
pub fn language_detection_prompt(sample: &str) -> String {
    format!(
        "Analyze the following text from a Telegram group chat and determine the PRIMARY language used by the majority of participants.\n\n\
         Rules:\n\
         - If the chat is mixed language, determine which language is used MOST FREQUENTLY\n\
         - Consider both message content and typical patterns\n\
         - Respond with ONLY the language name in English (e.g., \"Russian\", \"English\", \"Spanish\", \"French\", \"German\", \"Chinese\", \"Arabic\", etc.)\n\
         - If it's clearly mixed with no dominant language, default to \"{fallback}\"\n\n\
         Text sample: {sample}",
        fallback = FALLBACK_LANGUAGE,
        sample = sample,
    )
}

/// Prompt answering `question` strictly from `transcript`, in `language`.
///
/// The question text appears exactly once.
pub fn answer_prompt(question: &str, language: &str, transcript: &str) -> String {
    format!(
        "Based on the Telegram group messages from the last 14 days below, answer the question that follows them.\n\n\
         IMPORTANT: Respond in {language} language. All text should be in {language}.\n\n\
         Group Messages Context:\n\
         {transcript}\n\n\
         Instructions:\n\
         - Use only the information from the provided messages\n\
         - If the question cannot be answered from the context, say so explicitly and politely in {language}\n\
         - Provide specific examples or quotes when relevant\n\
         - Keep the response concise and helpful (max 1500 characters)\n\
         - Format it for a chat message with proper line breaks\n\
         - Use emojis appropriately\n\
         - Write in professional business style\n\
         - If the question is in a different language than {language}, still respond in {language}\n\
         - Include specific data, numbers, and facts when available\n\n\
         Question: \"{question}\"\n\n\
         Respond in: {language}",
    )
}

const ENGLISH_REPORT: &str = r#"Analyze the following Telegram group messages from the last 24 hours and create a MAXIMALLY DETAILED business report.

IMPORTANT: Respond in English.

Messages:
{transcript}

Create a COMPREHENSIVE structured business report with the following sections:

1. **📊 DETAILED ACTIVITY STATISTICS**
   - Total message count (exact number)
   - Number of active participants (full list)
   - TOP-5 most active participants with exact message counts for each
   - Peak activity hours (specify exact time ranges)
   - Average message length (in words)
   - Percentage of text vs media messages

2. **🎯 COMPREHENSIVE TOPICS & PROJECTS ANALYSIS**
   - Group ALL messages by work topics/projects
   - For EACH topic: message count, key participants, main points, discussion status
   - Priority tasks, completed tasks and who completed them, incomplete tasks and reasons

3. **👥 FULL PARTICIPANT ANALYSIS**
   - COMPLETE list of ALL participants with message counts (sorted descending)
   - For each active participant: main topics and role (initiator, executor, commentator)
   - New and inactive participants

4. **📈 KEY DECISIONS AND RESULTS**
   - ALL decisions made with full description
   - ALL assigned tasks: who assigned, assignee, deadline, current status
   - Achieved results, problems and their solutions, open questions

5. **💬 DETAILED COMMUNICATION ANALYSIS**
   - Communication style and tone
   - Team engagement level and response speed
   - Feedback quality, conflicts or disagreements (if any)

6. **🔍 DEEP INSIGHTS AND PATTERNS**
   - Recurring themes, discussion trends, activity patterns
   - Communication effectiveness, process bottlenecks, improvement opportunities

7. **⚡ IMPORTANT MOMENTS & HIGHLIGHTS**
   - Critically important messages or decisions
   - Urgent matters, risks and warnings, opportunities not to be missed

8. **📋 PLANS AND NEXT STEPS**
   - Scheduled meetings (time, participants, purpose)
   - Upcoming tasks with priorities and important dates
   - Specific recommendations and action items for each participant

9. **📝 EXECUTIVE SUMMARY**
   - Main achievements of the day
   - Key problems and takeaways
   - Overall project progress

Report format:
- Use a clear structure with headers
- Add ALL specific numbers and facts
- Highlight important information in *bold*
- Use emojis for section separation
- Write in professional business style
- If there is no information for a section, state so clearly
- Maximum 4000 characters

Respond in English."#;

const RUSSIAN_REPORT: &str = r#"Проанализируйте следующие сообщения Telegram группы за последние 24 часа и создайте МАКСИМАЛЬНО ДЕТАЛЬНЫЙ деловой отчет.

ВАЖНО: Отвечайте строго на русском языке.

Сообщения:
{transcript}

Создайте ДЕТАЛИЗИРОВАННЫЙ структурированный деловой отчет со следующими разделами:

1. **📊 ДЕТАЛЬНАЯ СТАТИСТИКА АКТИВНОСТИ**
   - Общее количество сообщений (точное число)
   - Количество активных участников (полный список)
   - ТОП-5 самых активных участников с количеством сообщений
   - Часы пиковой активности
   - Средняя длина сообщений (в словах)
   - Процент текстовых и медиа сообщений

2. **🎯 ПОДРОБНЫЙ АНАЛИЗ ТЕМ И ПРОЕКТОВ**
   - Сгруппируйте ВСЕ сообщения по рабочим темам/проектам
   - Для КАЖДОЙ темы: количество сообщений, ключевые участники, основные выводы, статус
   - Приоритетные, завершенные и незавершенные задачи

3. **👥 ПОЛНЫЙ АНАЛИЗ УЧАСТНИКОВ**
   - ПОЛНЫЙ список участников с количеством сообщений (по убыванию)
   - Для каждого активного участника: темы и роль (инициатор, исполнитель, комментатор)
   - Новые и неактивные участники

4. **📈 КЛЮЧЕВЫЕ РЕШЕНИЯ И РЕЗУЛЬТАТЫ**
   - ВСЕ принятые решения с описанием
   - ВСЕ назначенные задачи: кто назначил, исполнитель, сроки, статус
   - Достигнутые результаты, проблемы и их решения, открытые вопросы

5. **💬 ДЕТАЛЬНЫЙ АНАЛИЗ КОММУНИКАЦИИ**
   - Стиль и тон общения
   - Уровень вовлеченности и скорость реакции
   - Качество обратной связи, конфликты (если были)

6. **🔍 ГЛУБОКИЕ ИНСАЙТЫ И ПАТТЕРНЫ**
   - Повторяющиеся темы, тренды, паттерны активности
   - Эффективность коммуникации, узкие места, возможности для улучшения

7. **⚡ ВАЖНЫЕ МОМЕНТЫ И АКЦЕНТЫ**
   - Критически важные сообщения или решения
   - Срочные вопросы, риски, возможности

8. **📋 ПЛАНЫ И СЛЕДУЮЩИЕ ШАГИ**
   - Запланированные встречи (время, участники, цель)
   - Предстоящие задачи с приоритетами и важные даты
   - Конкретные рекомендации и action items для каждого участника

9. **📝 ИТОГОВОЕ РЕЗЮМЕ**
   - Главные достижения за день
   - Основные проблемы и выводы
   - Общий прогресс по проектам

Формат отчета:
- Четкая структура с заголовками
- ВСЕ конкретные цифры и факты
- Важная информация *жирным шрифтом*
- Эмодзи для разделения секций
- Профессиональный деловой стиль
- Если информации по разделу нет, так и напишите
- Максимум 4000 символов

Отвечай на русском языке."#;
