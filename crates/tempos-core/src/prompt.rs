//! Prompt contracts as static data.
//!
//! Each pipeline owns a [`PromptTemplate`]: a system instruction, an ordered
//! list of worked examples, and a formatter for the final human turn. The
//! builder turns a template plus the caller's input into a transcript.

use crate::llm::ChatMessage;

/// A worked example shown to the model before the real input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FewShot {
    pub input: &'static str,
    pub output: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub system: &'static str,
    pub examples: &'static [FewShot],
    pub final_turn: fn(&str) -> String,
}

impl PromptTemplate {
    /// System turn, then one human/assistant pair per example, then the input.
    pub fn build(&self, input: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2 + self.examples.len() * 2);
        messages.push(ChatMessage::system(self.system));
        for example in self.examples {
            messages.push(ChatMessage::human(example.input));
            messages.push(ChatMessage::assistant(example.output));
        }
        messages.push(ChatMessage::human((self.final_turn)(input)));
        messages
    }
}

pub const EXTRACTION_SYSTEM: &str = "You are an expert schedule extraction engine.\n\
Task: Convert a user's natural-language schedule text into STRICT JSON.\n\
Rules:\n\
- Output ONLY JSON (no preface, no trailing text).\n\
- Use keys: title (str), details (str), start (str|nullable), end (str|nullable),\n  location (str), tags (list[str]).\n\
- For start/end, return ISO 8601 WITHOUT timezone (e.g., 2025-08-28 14:30),\n  or null if unknown.\n\
- If duration provided (e.g., 'for 2 hours'), compute end.\n\
- Infer reasonable title (max 8 words).\n\
- tags: short keywords (e.g., ['work','call']).\n";

pub const EXTRACTION_EXAMPLES: &[FewShot] = &[
    FewShot {
        input: "Lunch with Sara next Tuesday at 1pm for 90 minutes at Cafe Zaha, discuss Q3 hiring",
        output: r#"{"title": "Lunch with Sara", "details": "Discuss Q3 hiring", "start": "2025-09-02 13:00", "end": "2025-09-02 14:30", "location": "Cafe Zaha", "tags": ["lunch", "meeting"]}"#,
    },
    FewShot {
        input: "Submit scholarship application by Sept 10",
        output: r#"{"title": "Submit scholarship application", "details": "", "start": "2025-09-10 09:00", "end": null, "location": "", "tags": ["deadline"]}"#,
    },
];

fn extraction_turn(text: &str) -> String {
    format!("Text: {}\nReturn JSON only.", text)
}

pub const EXTRACTION_PROMPT: PromptTemplate = PromptTemplate {
    system: EXTRACTION_SYSTEM,
    examples: EXTRACTION_EXAMPLES,
    final_turn: extraction_turn,
};

pub const REPAIR_SYSTEM: &str = "Fix and output ONLY valid JSON for a schedule with keys: \
title, details, start, end, location, tags. No commentary.";

pub fn repair_messages(malformed: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::system(REPAIR_SYSTEM), ChatMessage::human(malformed)]
}

pub const SQL_SYSTEM: &str = "You translate natural-language schedule queries into SQLite SELECT statements.\n\
Schema:\n\
- Table schedules(id INTEGER PRIMARY KEY, title TEXT, details TEXT, start_ts TEXT, end_ts TEXT, location TEXT, tags TEXT, created_at TEXT, updated_at TEXT).\n\
- start_ts, end_ts, created_at and updated_at hold ISO 8601 UTC text such as 2025-08-28T09:30:00Z; tags is a comma-separated list.\n\
Rules:\n\
- Return ONLY the SQL, no commentary, no code fences.\n\
- SELECT-only; never modify data.\n\
- Use ISO timestamps in conditions if needed.\n\
- If time window implied (e.g., 'this week'), compute a reasonable range using CURRENT_TIMESTAMP.\n\
- Always ORDER BY start_ts IS NULL, start_ts, id.\n";

pub const SQL_EXAMPLES: &[FewShot] = &[
    FewShot {
        input: "what's on Friday?",
        output: "SELECT id, title, start_ts, end_ts, location, tags FROM schedules\n\
WHERE date(start_ts) = date('now','weekday 5')\n\
ORDER BY start_ts IS NULL, start_ts, id;",
    },
    FewShot {
        input: "deadlines next 7 days",
        output: "SELECT id, title, start_ts, end_ts, location, tags FROM schedules\n\
WHERE start_ts >= strftime('%Y-%m-%dT%H:%M:%SZ','now') AND start_ts < strftime('%Y-%m-%dT%H:%M:%SZ','now','+7 days')\n\
AND (tags LIKE '%deadline%' OR title LIKE '%submit%' OR details LIKE '%deadline%')\n\
ORDER BY start_ts IS NULL, start_ts, id;",
    },
    FewShot {
        input: "meetings in casablanca this month",
        output: "SELECT id, title, start_ts, end_ts, location, tags FROM schedules\n\
WHERE strftime('%Y-%m',start_ts) = strftime('%Y-%m','now')\n\
AND (location LIKE '%Casablanca%' OR details LIKE '%Casablanca%')\n\
AND (tags LIKE '%meeting%' OR title LIKE '%meeting%' OR title LIKE '%call%')\n\
ORDER BY start_ts IS NULL, start_ts, id;",
    },
];

fn sql_turn(question: &str) -> String {
    format!("NL query: {}\nSQL:", question)
}

pub const SQL_PROMPT: PromptTemplate = PromptTemplate {
    system: SQL_SYSTEM,
    examples: SQL_EXAMPLES,
    final_turn: sql_turn,
};

pub const SUMMARY_SYSTEM: &str =
    "Summarize the following schedule rows for the user in 2-4 bullet points. Be concise.";

pub fn summary_messages(question: &str, rows_json: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SUMMARY_SYSTEM),
        ChatMessage::human(format!("Question: {}\nRows: {}", question, rows_json)),
    ]
}
