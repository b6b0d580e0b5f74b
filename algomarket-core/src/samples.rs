//! Sample marketplace data.
//!
//! Used to seed the development backend and as fixtures in tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::algorithm::{Algorithm, ModeratedAlgorithm};
use crate::id::AlgorithmId;
use crate::status::AlgorithmStatus;
use crate::submission::DEFAULT_PAID_PRICE;

#[expect(clippy::unwrap_used, reason = "hard-coded calendar dates are valid")]
fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).single().unwrap()
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| (*t).to_owned()).collect()
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    title: &str,
    description: &str,
    author: &str,
    tag_list: &[&str],
    paid: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Algorithm {
    Algorithm {
        id: AlgorithmId::new(id),
        title: title.to_owned(),
        description: description.to_owned(),
        author: author.to_owned(),
        tags: tags(tag_list),
        is_paid: paid,
        price: paid.then_some(DEFAULT_PAID_PRICE),
        code: None,
        language: "cpp".to_owned(),
        compiler: "g++".to_owned(),
        created_at,
        updated_at,
    }
}

/// Three published algorithms: two free, one paid.
#[must_use]
pub fn sample_catalog() -> Vec<Algorithm> {
    vec![
        listing(
            "1",
            "Быстрая сортировка (Quick Sort)",
            "Эффективный алгоритм сортировки со средней сложностью O(n log n).",
            "Иван Иванов",
            &["сортировка", "C++", "рекурсия"],
            false,
            day(2024, 1, 15),
            day(2024, 1, 15),
        ),
        listing(
            "2",
            "Алгоритм Дейкстры",
            "Кратчайший путь в графе с неотрицательными весами рёбер.",
            "Петр Петров",
            &["графы", "поиск пути", "C++"],
            true,
            day(2024, 1, 10),
            day(2024, 1, 12),
        ),
        listing(
            "3",
            "Двоичный поиск",
            "Поиск в отсортированном массиве за O(log n).",
            "Мария Сидорова",
            &["поиск", "массивы", "C++"],
            false,
            day(2024, 1, 8),
            day(2024, 1, 8),
        ),
    ]
}

/// A moderation queue: `a` and `b` pending, `c` approved, `d` rejected.
#[must_use]
pub fn sample_queue() -> Vec<ModeratedAlgorithm> {
    let mut a = ModeratedAlgorithm::pending(
        AlgorithmId::new("a"),
        "Topological sort",
        "Kahn's algorithm over an adjacency list.",
        "ivan",
        day(2024, 2, 1),
    );
    a.tags = tags(&["graphs", "C++"]);
    a.code = Some("std::vector<int> topo(const Graph& g);".to_owned());

    let mut b = ModeratedAlgorithm::pending(
        AlgorithmId::new("b"),
        "Fenwick tree",
        "Prefix sums with point updates in O(log n).",
        "maria",
        day(2024, 2, 2),
    );
    b.tags = tags(&["trees", "C++", "trees"]);

    let mut c = ModeratedAlgorithm::pending(
        AlgorithmId::new("c"),
        "KMP",
        "Linear-time substring search.",
        "petr",
        day(2024, 1, 20),
    );
    c.status = AlgorithmStatus::Approved;
    c.moderated_by = Some("moderator".to_owned());
    c.moderated_at = Some(day(2024, 1, 21));

    let mut d = ModeratedAlgorithm::pending(
        AlgorithmId::new("d"),
        "Bubble sort",
        "Sorting.",
        "anon",
        day(2024, 1, 22),
    );
    d.status = AlgorithmStatus::Rejected;
    d.rejection_reason = Some("duplicate".to_owned());
    d.moderated_by = Some("moderator".to_owned());
    d.moderated_at = Some(day(2024, 1, 23));

    vec![a, b, c, d]
}
