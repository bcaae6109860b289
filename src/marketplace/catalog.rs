//! Read-only sample product catalog

use crate::telegram::messages;

/// A listed product. Prices are in won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub title: &'static str,
    pub price: u64,
}

/// Sample listings shown by `/products` and searched by `/search`.
pub const SAMPLE_PRODUCTS: &[Product] = &[
    Product {
        title: "iPhone 15 Pro",
        price: 1_200_000,
    },
    Product {
        title: "나이키 에어맥스",
        price: 150_000,
    },
    Product {
        title: "클린 코드 도서",
        price: 25_000,
    },
];

/// Product listing source. Only the static sample exists for now.
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    products: &'static [Product],
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(SAMPLE_PRODUCTS)
    }
}

impl Catalog {
    pub fn new(products: &'static [Product]) -> Self {
        Self { products }
    }

    pub fn products(&self) -> &'static [Product] {
        self.products
    }

    /// Case-insensitive substring match on the title.
    pub fn search(&self, keyword: &str) -> Vec<Product> {
        let needle = keyword.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&needle))
            .copied()
            .collect()
    }

    /// `/products` reply.
    pub fn render_list(&self) -> String {
        format!("{}\n{}", messages::PRODUCTS_HEADER, render_lines(self.products))
    }

    /// `/search` reply.
    pub fn render_search(&self, keyword: &str) -> String {
        let found = self.search(keyword);
        if found.is_empty() {
            return messages::search_empty(keyword.trim());
        }
        format!("{}\n{}", messages::SEARCH_HEADER, render_lines(&found))
    }
}

fn render_lines(products: &[Product]) -> String {
    products
        .iter()
        .map(|p| format!("{} - {}원", p.title, p.price))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_list_matches_sample_catalog() {
        let text = Catalog::default().render_list();
        assert_eq!(
            text,
            "상품 목록:\niPhone 15 Pro - 1200000원\n나이키 에어맥스 - 150000원\n클린 코드 도서 - 25000원"
        );
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let found = Catalog::default().search("IPHONE");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "iPhone 15 Pro");
    }

    #[test]
    fn test_search_matches_korean_titles() {
        let text = Catalog::default().render_search("에어맥스");
        assert_eq!(text, "검색 결과:\n나이키 에어맥스 - 150000원");
    }

    #[test]
    fn test_search_without_hits() {
        let text = Catalog::default().render_search("galaxy");
        assert_eq!(text, "\"galaxy\"에 대한 검색 결과가 없습니다.");
    }
}
