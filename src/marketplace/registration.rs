//! Product registration state machine
//!
//! `NONE → NAME → PRICE → DESCRIPTION → LOCATION → done`
//!
//! NONE is the absence of a session in the [`SessionStore`](crate::storage::SessionStore).
//! Each waiting state carries exactly the answers collected before it, so a
//! price can never exist without a name.

use std::fmt;

use crate::telegram::messages;

/// A chat's position in the registration flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStep {
    AwaitingName,
    AwaitingPrice {
        name: String,
    },
    AwaitingDescription {
        name: String,
        price: String,
    },
    AwaitingLocation {
        name: String,
        price: String,
        description: String,
    },
}

/// Everything collected by a finished registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredProduct {
    pub name: String,
    pub price: String,
    pub description: String,
    pub location: String,
}

/// Result of feeding one answer into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Session moves on; `prompt` asks for the next field
    Next {
        step: RegistrationStep,
        prompt: &'static str,
    },
    /// Last answer received; the session must be removed
    Complete(RegisteredProduct),
}

impl RegistrationStep {
    /// State entered by `/sell`, with the prompt to send.
    pub fn start() -> (Self, &'static str) {
        (RegistrationStep::AwaitingName, messages::REGISTRATION_START)
    }

    /// Name of the field this step is waiting for.
    pub fn field(&self) -> &'static str {
        match self {
            RegistrationStep::AwaitingName => "name",
            RegistrationStep::AwaitingPrice { .. } => "price",
            RegistrationStep::AwaitingDescription { .. } => "description",
            RegistrationStep::AwaitingLocation { .. } => "location",
        }
    }

    /// Stores `answer` for the current step and moves to the next one.
    ///
    /// The answer is kept verbatim.
    pub fn advance(self, answer: &str) -> Transition {
        let answer = answer.to_string();
        match self {
            RegistrationStep::AwaitingName => Transition::Next {
                step: RegistrationStep::AwaitingPrice { name: answer },
                prompt: messages::PROMPT_PRICE,
            },
            RegistrationStep::AwaitingPrice { name } => Transition::Next {
                step: RegistrationStep::AwaitingDescription { name, price: answer },
                prompt: messages::PROMPT_DESCRIPTION,
            },
            RegistrationStep::AwaitingDescription { name, price } => Transition::Next {
                step: RegistrationStep::AwaitingLocation {
                    name,
                    price,
                    description: answer,
                },
                prompt: messages::PROMPT_LOCATION,
            },
            RegistrationStep::AwaitingLocation {
                name,
                price,
                description,
            } => Transition::Complete(RegisteredProduct {
                name,
                price,
                description,
                location: answer,
            }),
        }
    }
}

impl fmt::Display for RegistrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field())
    }
}

impl RegisteredProduct {
    /// Completion message listing every collected value.
    pub fn summary(&self) -> String {
        format!(
            "상품 등록이 완료되었습니다!\n상품명: {}\n가격: {}원\n설명: {}\n위치: {}",
            self.name, self.price, self.description, self.location
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feed(step: RegistrationStep, answer: &str) -> RegistrationStep {
        match step.advance(answer) {
            Transition::Next { step, .. } => step,
            Transition::Complete(_) => panic!("registration finished too early"),
        }
    }

    #[test]
    fn test_start_prompts_for_name() {
        let (step, prompt) = RegistrationStep::start();
        assert_eq!(step, RegistrationStep::AwaitingName);
        assert!(prompt.contains("상품명을 입력해주세요."));
    }

    #[test]
    fn test_prompts_follow_field_order() {
        let (step, _) = RegistrationStep::start();
        let Transition::Next { step, prompt } = step.advance("Widget") else {
            panic!("expected price step");
        };
        assert_eq!(prompt, "가격을 입력해주세요.");
        assert_eq!(step.field(), "price");

        let Transition::Next { step, prompt } = step.advance("1000") else {
            panic!("expected description step");
        };
        assert_eq!(prompt, "상품 설명을 입력해주세요.");
        assert_eq!(step.field(), "description");

        let Transition::Next { step, prompt } = step.advance("Like new") else {
            panic!("expected location step");
        };
        assert_eq!(prompt, "거래 위치를 입력해주세요.");
        assert_eq!(step.field(), "location");
    }

    #[test]
    fn test_full_flow_completes_with_verbatim_values() {
        let (step, _) = RegistrationStep::start();
        let step = feed(step, "  Widget ");
        let step = feed(step, "12,000");
        let step = feed(step, "두 번 사용했습니다");
        let Transition::Complete(product) = step.advance("서울 강남역") else {
            panic!("expected completion");
        };

        assert_eq!(
            product,
            RegisteredProduct {
                name: "  Widget ".to_string(),
                price: "12,000".to_string(),
                description: "두 번 사용했습니다".to_string(),
                location: "서울 강남역".to_string(),
            }
        );

        let summary = product.summary();
        assert!(summary.starts_with("상품 등록이 완료되었습니다!"));
        assert!(summary.contains("상품명:   Widget "));
        assert!(summary.contains("가격: 12,000원"));
        assert!(summary.contains("설명: 두 번 사용했습니다"));
        assert!(summary.contains("위치: 서울 강남역"));
    }

    #[test]
    fn test_display_names_the_awaited_field() {
        let step = RegistrationStep::AwaitingDescription {
            name: "a".into(),
            price: "1".into(),
        };
        assert_eq!(step.to_string(), "description");
    }
}
