//! Prompt builders for every generation call the engine makes.
//!
//! Each function renders one complete prompt. The rubric wording is
//! load-bearing: the score extractor parses the evaluator's reply
//! against the exact labels requested here.

use crate::engine::IterationRecord;

/// Answer generation prompt, optionally preceded by run context
/// (ingested sources and iteration history).
pub fn generation_prompt(question: &str, context: &str) -> String {
    if context.trim().is_empty() {
        format!("根據以下問題生成答案：{}", question)
    } else {
        format!("{}\n\n根據以下問題生成答案：{}", context.trim_end(), question)
    }
}

/// Rubric evaluation prompt. Asks for per-aspect scores out of 10 and a
/// clearly labelled total out of 50.
pub fn rubric_prompt(question: &str, answer: &str, core_facts: &str, sources: &str) -> String {
    let mut prompt = format!("問題是：{}\n答案是：{}\n", question, answer);

    if !core_facts.trim().is_empty() {
        prompt.push_str(&format!(
            "\n評估時請以下列核心事實為基準，答案偏離或遺漏這些事實應扣分：\n{}\n",
            core_facts.trim()
        ));
    }

    if !sources.trim().is_empty() {
        prompt.push_str(&format!("\n可參考的補充資料：\n{}\n", sources.trim()));
    }

    prompt.push_str(
        "\n請對這個答案進行全面評估，考慮以下方面：\n\
         1. 準確性 (0-10分)\n\
         2. 全面性 (0-10分)\n\
         3. 深度 (0-10分)\n\
         4. 相關例子的使用 (0-10分)\n\
         5. 論證的邏輯性 (0-10分)\n\n\
         為每個方面打分，並給出簡要評論。最後，給出總評分（滿分50分）和改進建議。\n\
         請確保在評分後明確標註\"總評分：\"，例如\"總評分：42/50\"。",
    );

    prompt
}

/// Prompt-optimization prompt: turn the rubric feedback into a strictly
/// better next-generation prompt.
pub fn optimizer_prompt(question: &str, answer: &str, evaluation: &str, core_facts: &str) -> String {
    let mut prompt = format!(
        "原始問題：{}\n當前答案：{}\n評估結果：{}\n",
        question, answer, evaluation
    );

    if !core_facts.trim().is_empty() {
        prompt.push_str(&format!("必須保留的核心事實：\n{}\n", core_facts.trim()));
    }

    prompt.push_str(
        "\n根據以上信息，請生成一個新的提示，以改進答案的質量。新提示應該：\n\
         1. 針對評估中指出的不足之處\n\
         2. 保留原答案中的優點\n\
         3. 鼓勵更深入、更全面的回答\n\
         4. 要求提供更多相關的具體例子\n\
         5. 引用學術研究數據去支持論點(要有出處)\n\
         6. 如涉及專業名詞、人名、地方名、公司名稱等，要使用中英對照\n\n\
         請生成新的提示：",
    );

    prompt
}

/// Core fact extraction: 1-3 bullets strictly derivable from the answer.
pub fn fact_extraction_prompt(answer: &str, question: &str) -> String {
    format!(
        "問題是：{}\n答案是：{}\n\n\
         請從上述答案中提取 1 至 3 條與問題直接相關的核心事實，以「- 」開頭逐條列出。\n\
         只可列出答案中明確陳述的事實，嚴禁推測、延伸或補充答案以外的資訊。\n\
         只輸出事實列表，不要任何其他文字。",
        question, answer
    )
}

/// Silent fact-check rewrite: the output must be a complete answer with
/// no commentary about the checking itself.
pub fn fact_check_prompt(answer: &str, core_facts: &str, question: &str) -> String {
    format!(
        "問題是：{}\n\n核心事實：\n{}\n\n待檢查的答案：\n{}\n\n\
         請檢查上述答案是否完整包含所有核心事實。\n\
         若有遺漏或與事實矛盾之處，請直接輸出修正後的完整答案；若沒有問題，請原樣輸出答案。\n\
         輸出中不得包含任何關於檢查過程的說明或評論，只輸出答案本身。",
        question,
        core_facts.trim(),
        answer
    )
}

/// Final synthesis: restate the best answer in full, self-contained form.
pub fn synthesis_prompt(question: &str, best_answer: &str, core_facts: &str) -> String {
    let mut prompt = format!(
        "原始問題：{}\n目前最佳答案：\n{}\n",
        question, best_answer
    );

    if !core_facts.trim().is_empty() {
        prompt.push_str(&format!("\n必須包含的核心事實：\n{}\n", core_facts.trim()));
    }

    prompt.push_str(
        "\n請基於以上內容，重新寫出一個完整、詳盡、可獨立閱讀的最終答案。\n\
         保留所有核心事實與論點，補充具體例子與引用出處，專業名詞使用中英對照。\n\
         只輸出最終答案本身。",
    );

    prompt
}

/// Comparison narrative between a baseline answer and the refined answer.
pub fn comparison_prompt(question: &str, answer_a: &str, answer_b: &str) -> String {
    format!(
        "請比較以下兩個針對使用者問題「{}」的答案：\n\n\
         答案 A:\n{}\n\n\
         答案 B:\n{}\n\n\
         請從準確性、全面性、深度、例子的使用和論證的邏輯性五方面就兩者評分，\
         最低 0 分，最高 10 分，你會推薦使用哪組答案並以 100 字內講出原因。",
        question, answer_a, answer_b
    )
}

/// Render the accumulated iteration history as prompt context. Later
/// iterations see strictly more history; nothing is ever pruned.
pub fn history_context(records: &[IterationRecord]) -> String {
    let mut context = String::new();
    for record in records {
        context.push_str(&format!(
            "前一次回答：{}\n評估：{}\n",
            record.answer, record.evaluation.raw
        ));
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rubric::Evaluation;

    #[test]
    fn test_generation_prompt_without_context() {
        let prompt = generation_prompt("法國的首都是哪裡？", "");
        assert!(prompt.starts_with("根據以下問題生成答案："));
        assert!(prompt.contains("法國的首都是哪裡？"));
    }

    #[test]
    fn test_generation_prompt_with_context() {
        let prompt = generation_prompt("Q", "source: https://example.com\nsome text");
        assert!(prompt.starts_with("source: https://example.com"));
        assert!(prompt.ends_with("根據以下問題生成答案：Q"));
    }

    #[test]
    fn test_rubric_prompt_mentions_all_aspects() {
        let prompt = rubric_prompt("Q", "A", "", "");
        for aspect in ["準確性", "全面性", "深度", "相關例子", "論證的邏輯性"] {
            assert!(prompt.contains(aspect), "missing aspect {}", aspect);
        }
        assert!(prompt.contains("總評分："));
    }

    #[test]
    fn test_rubric_prompt_includes_facts_and_sources() {
        let prompt = rubric_prompt("Q", "A", "- 巴黎是首都", "source: https://example.com");
        assert!(prompt.contains("核心事實"));
        assert!(prompt.contains("巴黎是首都"));
        assert!(prompt.contains("補充資料"));

        let bare = rubric_prompt("Q", "A", "", "");
        assert!(!bare.contains("核心事實"));
        assert!(!bare.contains("補充資料"));
    }

    #[test]
    fn test_optimizer_prompt_contains_inputs() {
        let prompt = optimizer_prompt("Q", "A", "E", "- fact");
        assert!(prompt.contains("原始問題：Q"));
        assert!(prompt.contains("當前答案：A"));
        assert!(prompt.contains("評估結果：E"));
        assert!(prompt.contains("- fact"));
        assert!(prompt.contains("中英對照"));
    }

    #[test]
    fn test_fact_extraction_prompt_forbids_speculation() {
        let prompt = fact_extraction_prompt("A", "Q");
        assert!(prompt.contains("1 至 3 條"));
        assert!(prompt.contains("嚴禁推測"));
    }

    #[test]
    fn test_fact_check_prompt_forbids_commentary() {
        let prompt = fact_check_prompt("A", "- f1", "Q");
        assert!(prompt.contains("核心事實"));
        assert!(prompt.contains("不得包含任何關於檢查過程的說明"));
    }

    #[test]
    fn test_history_context_renders_in_order() {
        let records = vec![
            IterationRecord {
                index: 0,
                answer: "first".to_string(),
                evaluation: Evaluation::unscored("eval-0"),
                tokens_used: 10,
            },
            IterationRecord {
                index: 1,
                answer: "second".to_string(),
                evaluation: Evaluation::unscored("eval-1"),
                tokens_used: 10,
            },
        ];

        let context = history_context(&records);
        let first = context.find("first").unwrap();
        let second = context.find("second").unwrap();
        assert!(first < second);
        assert!(context.contains("eval-0"));
        assert!(context.contains("eval-1"));
    }

    #[test]
    fn test_history_context_empty() {
        assert!(history_context(&[]).is_empty());
    }
}
