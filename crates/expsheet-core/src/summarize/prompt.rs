use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: Role::User,
            content: content.into(),
        }
    }
}

const SYSTEM_ROLE: &str = "당신은 행정업무를 도와주는 챗봇입니다.";

const DOCUMENT_INTRO: &str = "다음 입력된 데이터를 바탕으로 데이터시트로 정리해줘:";

/// Datasheet columns, in the order the table should have them.
pub const FIELDS: [&str; 8] = [
    "사용자",
    "사용일시",
    "사용 장소",
    "집행목적",
    "인원",
    "금액",
    "방법",
    "비목",
];

/// Who the user is, which expense category to skip, and the allowed payment methods.
const USER_AND_METHOD_RULES: &str = "사용자는 제목이 시책추진업무추진비 이면 과장이고 기관운영업무추진비 이면 국장이야. \
그리고 부서운영추진비 데이터시트를 만들지마. 방법은 카드 나 현금이야.";

const LOCATION_AND_PURPOSE_RULES: &str =
    "사용장소는 상호명만 적어줘. 집행목적도 간단하게 10자 정도로 정리해.";

const TABLE_FORMAT: &str = "데이터시트를 markdown 테이블로 만들어줘.";

/// Build the fixed instruction sequence around `document_text`.
pub fn build_messages(document_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_ROLE),
        ChatMessage::user(format!("{DOCUMENT_INTRO}\n\n{document_text}")),
        ChatMessage::user(FIELDS.join(" / ")),
        ChatMessage::user(USER_AND_METHOD_RULES),
        ChatMessage::user(LOCATION_AND_PURPOSE_RULES),
        ChatMessage::user(TABLE_FORMAT),
    ]
}
