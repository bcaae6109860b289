//! User-facing reply texts (Korean)

use indoc::indoc;

pub const START: &str = indoc! {"
    🎉 안녕하세요! 텔레그램 마켓플레이스 봇입니다.

    /help 명령어로 사용법을 확인하세요!"};

pub const HELP: &str = indoc! {"
    📋 사용 가능한 명령어:

    🚀 /start - 봇 시작
    ❓ /help - 도움말
    🛒 /products - 상품 목록
    🔍 /search <키워드> - 상품 검색
    ➕ /sell - 상품 등록
    ✋ /cancel - 상품 등록 취소
    👛 /wallet - 지갑 주소 확인
    💰 /balance - 지갑 잔액 조회
    💸 /pay <주소> <ETH 금액> - ETH 전송"};

pub const REGISTRATION_START: &str = "상품 등록을 시작합니다. 상품명을 입력해주세요.";
pub const PROMPT_PRICE: &str = "가격을 입력해주세요.";
pub const PROMPT_DESCRIPTION: &str = "상품 설명을 입력해주세요.";
pub const PROMPT_LOCATION: &str = "거래 위치를 입력해주세요.";
pub const REGISTRATION_CANCELLED: &str = "상품 등록을 취소했습니다.";
pub const NO_REGISTRATION: &str = "진행 중인 상품 등록이 없습니다.";

pub const PRODUCTS_HEADER: &str = "상품 목록:";
pub const SEARCH_HEADER: &str = "검색 결과:";

pub const PAY_USAGE: &str = "사용법: /pay <주소> <ETH 금액>";
pub const SEARCH_USAGE: &str = "사용법: /search <키워드>";

pub const CHAIN_NOT_CONFIGURED: &str = "웹3 제공자 설정이 필요합니다.";
pub const BALANCE_FAILED: &str = "잔액 조회 실패";
pub const PAYMENT_FAILED: &str = "전송 실패";

pub fn wallet_address(address: &str) -> String {
    format!("지갑 주소: {}", address)
}

pub fn balance(ether: &str) -> String {
    format!("잔액: {} ETH", ether)
}

pub fn payment_sent(tx_hash: &str) -> String {
    format!("전송 완료: {}", tx_hash)
}

pub fn search_empty(keyword: &str) -> String {
    format!("\"{}\"에 대한 검색 결과가 없습니다.", keyword)
}

pub fn unknown_command(text: &str) -> String {
    format!(
        "❓ \"{}\"는 알 수 없는 명령어입니다.\n\n/help를 입력해서 사용 가능한 명령어를 확인하세요.",
        text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command() {
        for command in [
            "/start", "/help", "/products", "/search", "/sell", "/cancel", "/wallet", "/balance", "/pay",
        ] {
            assert!(HELP.contains(command), "help text is missing {}", command);
        }
    }

    #[test]
    fn test_start_has_no_leading_indent() {
        assert!(START.starts_with("🎉"));
        assert!(!HELP.lines().any(|line| line.starts_with(' ')));
    }

    #[test]
    fn test_unknown_command_quotes_input() {
        let text = unknown_command("hello");
        assert!(text.starts_with("❓ \"hello\"는 알 수 없는 명령어입니다."));
    }

    #[test]
    fn test_unknown_command_trims_quoted_input() {
        let text = unknown_command("  hi \n");
        assert!(text.starts_with("❓ \"hi\"는 알 수 없는 명령어입니다."));
    }
}
