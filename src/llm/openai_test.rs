use super::*;

#[test]
fn parse_text_response() {
    let json = serde_json::json!({
        "model": "gpt-35-turbo",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "1. Contoso - Data Intern" },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 31, "completion_tokens": 12 }
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text.as_deref(), Some("1. Contoso - Data Intern"));
    assert_eq!(resp.model, "gpt-35-turbo");
    assert_eq!(resp.stop_reason, "stop");
    assert_eq!(resp.input_tokens, 31);
    assert_eq!(resp.output_tokens, 12);
}

#[test]
fn parse_null_content() {
    let json = serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": null }, "finish_reason": "content_filter" }]
    })
    .to_string();
    let resp = parse_chat_completions_response(&json).unwrap();
    assert_eq!(resp.text, None);
    assert_eq!(resp.stop_reason, "content_filter");
    assert_eq!(resp.input_tokens, 0);
}

#[test]
fn parse_missing_choices() {
    let json = serde_json::json!({ "model": "gpt-35-turbo", "choices": [] }).to_string();
    assert!(matches!(parse_chat_completions_response(&json), Err(LlmError::ApiParse(_))));
}

#[test]
fn parse_rejects_non_json() {
    assert!(matches!(parse_chat_completions_response("<html>"), Err(LlmError::ApiParse(_))));
}

#[test]
fn system_prompt_leads_messages() {
    let history = [Message::user("hi")];
    let msgs = build_messages("be brief", &history);
    assert_eq!(
        msgs,
        vec![CcMessage { role: "system", content: "be brief" }, CcMessage { role: "user", content: "hi" }]
    );
}

#[test]
fn blank_system_prompt_is_dropped() {
    let history = [Message::user("hi"), Message { role: "assistant".into(), content: "hello".into() }];
    let msgs = build_messages("  ", &history);
    assert_eq!(msgs.len(), 2);
    assert_eq!(msgs[0].role, "user");
}

#[test]
fn request_serializes_chat_completions_shape() {
    let history = [Message::user("hi")];
    let msgs = build_messages("sys", &history);
    let body = CcRequest { model: "m", max_tokens: 64, messages: &msgs };
    let value = serde_json::to_value(&body).unwrap();
    assert_eq!(value["model"], "m");
    assert_eq!(value["max_tokens"], 64);
    assert_eq!(value["messages"][0]["role"], "system");
    assert_eq!(value["messages"][1]["content"], "hi");
}
