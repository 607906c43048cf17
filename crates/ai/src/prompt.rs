//! Prompt construction for the market assistant.
//!
//! Provides the system instruction, the stock context block, the replayed
//! conversation history and the suggested-question chips.

use marketmind_market_data::Instrument;

use crate::types::ChatTurn;

/// Context line used when no instrument is selected.
pub const DASHBOARD_CONTEXT: &str = "User is on the main dashboard.";

const MISSION: &str = "\
Your Mission:
- Help the user identify investment opportunities and understand market trends.
- Provide deep analysis of the stock currently being viewed (context provided).
- Use Google Search to find the absolute latest news, earnings reports, and analyst ratings when asked \"what to invest in\" or about specific companies.
- Synthesize data to offer pros and cons for potential investments.";

const RESPONSE_GUIDELINES: &str = "\
Response Guidelines:
- Be concise but insightful.
- Use Markdown for clear formatting (bold **Symbols**, bullet points for lists).
- If suggesting investments, explain the *reasoning* (e.g., \"Tech sector is rallying due to AI demand\").
- ALWAYS include a brief disclaimer that you are an AI and this is not professional financial advice.";

/// Build the system instruction around an optional stock context block.
pub fn system_instruction(context: Option<&str>) -> String {
    let context_line = match context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(ctx) => format!("Real-time Stock Data: {}", ctx),
        None => DASHBOARD_CONTEXT.to_string(),
    };

    format!(
        "You are MarketMind, an expert financial analyst and AI investment assistant.\n\n\
{}\n\n\
Context Data:\n{}\n\n\
{}",
        MISSION, context_line, RESPONSE_GUIDELINES
    )
}

/// One-line summary of an instrument for the model.
///
/// e.g. `Symbol: AAPL (Apple Inc.), Price: 175.50, Change: +1.20 (+0.69%), Volume: 4200`
pub fn context_block(instrument: &Instrument) -> String {
    format!(
        "Symbol: {} ({}), Price: {:.2}, Change: {:+.2} ({:+.2}%), Volume: {}",
        instrument.symbol(),
        instrument.display_name(),
        instrument.current_price(),
        instrument.absolute_change(),
        instrument.percent_change(),
        instrument.latest_volume()
    )
}

/// Render prior turns as `Speaker: text` lines, skipping failed turns.
pub fn render_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .filter(|turn| !turn.failed)
        .map(|turn| format!("{}: {}", turn.speaker.label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// User content sent with each request.
pub fn user_prompt(question: &str, history: &[ChatTurn]) -> String {
    format!(
        "Conversation History:\n{}\n\nCurrent Question: {}",
        render_history(history),
        question.trim()
    )
}

/// Starter questions offered before the user has said anything.
pub fn suggested_questions(instrument: Option<&Instrument>) -> Vec<String> {
    match instrument {
        Some(i) => {
            let symbol = i.symbol();
            vec![
                format!("What's driving {} today?", symbol),
                format!("Is {} a good buy right now?", symbol),
                format!("What are the main risks of holding {}?", symbol),
                format!("How does {} compare with its competitors?", symbol),
            ]
        }
        None => vec![
            "What sectors are trending this week?".to_string(),
            "What should I invest in right now?".to_string(),
            "Summarize today's market sentiment.".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use marketmind_market_data::DataPoint;

    fn instrument() -> Instrument {
        let point = |price: f64, volume: u64| DataPoint {
            timestamp: "10:00".to_string(),
            price,
            volume,
        };
        Instrument::from_window(
            "AAPL",
            "Apple Inc.",
            vec![point(200.0, 100), point(190.0, 4200)],
        )
        .unwrap()
    }

    #[test]
    fn test_system_instruction_context() {
        let with_ctx = system_instruction(Some("Symbol: AAPL"));
        assert!(with_ctx.contains("Real-time Stock Data: Symbol: AAPL"));
        assert!(!with_ctx.contains(DASHBOARD_CONTEXT));
        assert!(with_ctx.contains("not professional financial advice"));

        let without = system_instruction(None);
        assert!(without.contains(DASHBOARD_CONTEXT));
        assert_eq!(system_instruction(Some("  ")), without);
    }

    #[test]
    fn test_context_block() {
        assert_eq!(
            context_block(&instrument()),
            "Symbol: AAPL (Apple Inc.), Price: 190.00, Change: -10.00 (-5.00%), Volume: 4200"
        );
    }

    #[test]
    fn test_user_prompt_skips_failed_turns() {
        let now = Utc::now();
        let history = vec![
            ChatTurn::welcome("Hello!", now),
            ChatTurn::user("How is NVDA?", now),
            ChatTurn::failed(now),
            ChatTurn::user("And AMD?", now),
        ];

        let prompt = user_prompt("  Is this a good buy? ", &history);
        assert_eq!(
            prompt,
            "Conversation History:\n\
Assistant: Hello!\n\
User: How is NVDA?\n\
User: And AMD?\n\n\
Current Question: Is this a good buy?"
        );
    }

    #[test]
    fn test_suggestions() {
        let chips = suggested_questions(Some(&instrument()));
        assert_eq!(chips.len(), 4);
        assert!(chips.iter().all(|c| c.contains("AAPL")));
        assert_eq!(suggested_questions(None).len(), 3);
    }
}
