//! Field-name based criteria over `#[derive(FieldAccess)]` types.

use criteria::{
    ClauseValue, FieldAccess, FieldEnum, Number, Op, Specification, SpecificationError, Timestamp,
    Value,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Open,
    Blocked,
    Closed,
}

impl FieldEnum for Status {
    fn discriminant(&self) -> u32 {
        match self {
            Status::Open => 0,
            Status::Blocked => 1,
            Status::Closed => 2,
        }
    }
}

#[derive(Debug, Clone, criteria_macros::FieldAccess)]
struct Ticket {
    #[field(Number)]
    id: u32,

    #[field(String)]
    title: String,

    #[field(Enum)]
    status: Status,

    #[field(Timestamp, rename = "opened")]
    opened_at: Timestamp,

    #[field(Bool)]
    urgent: bool,

    #[field(String, optional, rename = "owner")]
    assignee: Option<String>,

    #[field(skip)]
    #[allow(dead_code)]
    notes: String,
}

fn ticket(id: u32, title: &str, status: Status, opened: i64, urgent: bool) -> Ticket {
    Ticket {
        id,
        title: title.to_string(),
        status,
        opened_at: Timestamp::from_secs(opened),
        urgent,
        assignee: (id % 2 == 0).then(|| format!("user{}", id)),
        notes: String::new(),
    }
}

fn tickets() -> Vec<Ticket> {
    vec![
        ticket(1, "Crash on save", Status::Open, 300, true),
        ticket(2, "Typo in docs", Status::Closed, 100, false),
        ticket(3, "Slow search", Status::Blocked, 200, true),
        ticket(4, "Crash on load", Status::Open, 400, false),
    ]
}

fn ids(items: Vec<Ticket>) -> Vec<u32> {
    items.into_iter().map(|t| t.id).collect()
}

#[test]
fn generated_constants_and_names() {
    assert_eq!(Ticket::ID, "id");
    assert_eq!(Ticket::TITLE, "title");
    assert_eq!(Ticket::OPENED, "opened");
    assert_eq!(Ticket::OWNER, "owner");
    assert_eq!(
        Ticket::field_names(),
        &["id", "title", "status", "opened", "urgent", "owner"]
    );
}

#[test]
fn generated_field_values() {
    let t = ticket(2, "Typo in docs", Status::Closed, 100, false);
    assert_eq!(t.field_value("id"), Value::Number(Number::U64(2)));
    assert_eq!(t.field_value("title"), Value::String("Typo in docs"));
    assert_eq!(t.field_value("status"), Value::Enum(2));
    assert_eq!(t.field_value("opened"), Value::Timestamp(Timestamp::from_secs(100)));
    assert_eq!(t.field_value("urgent"), Value::Bool(false));
    assert_eq!(t.field_value("owner"), Value::String("user2"));
    assert_eq!(t.field_value("notes"), Value::None);

    let unassigned = ticket(1, "x", Status::Open, 0, false);
    assert_eq!(unassigned.field_value("owner"), Value::None);
}

#[test]
fn clauses_over_every_kind() {
    let spec = Specification::<Ticket>::builder()
        .filter_clause(Ticket::TITLE, Op::Like, "crash%")
        .filter_clause(Ticket::STATUS, Op::In, vec![0u32, 1])
        .filter_clause(Ticket::OPENED, Op::After, Timestamp::from_secs(250))
        .filter_clause(Ticket::URGENT, Op::Is, true)
        .build()
        .unwrap();
    assert_eq!(ids(spec.evaluate(tickets()).unwrap()), vec![1]);

    let spec = Specification::<Ticket>::builder()
        .filter_clause(Ticket::STATUS, Op::Ne, ClauseValue::Enum(2))
        .filter_clause(Ticket::ID, Op::Lte, 3u32)
        .build()
        .unwrap();
    assert_eq!(ids(spec.evaluate(tickets()).unwrap()), vec![1, 3]);
}

#[test]
fn ordering_by_field_names() {
    let spec = Specification::<Ticket>::builder()
        .order_by_field_descending(Ticket::URGENT)
        .then_by_field(Ticket::OPENED)
        .build()
        .unwrap();
    assert_eq!(ids(spec.evaluate(tickets()).unwrap()), vec![3, 1, 2, 4]);
}

#[test]
fn missing_optional_values_sort_last() {
    let spec = Specification::<Ticket>::builder()
        .order_by_field(Ticket::OWNER)
        .build()
        .unwrap();
    assert_eq!(ids(spec.evaluate(tickets()).unwrap()), vec![2, 4, 1, 3]);
}

#[test]
fn search_field_uses_like_patterns() {
    let spec = Specification::<Ticket>::builder()
        .search_field(Ticket::TITLE, "%on%", 1)
        .search_field(Ticket::OWNER, "user_", 2)
        .build()
        .unwrap();
    assert_eq!(spec.search_criteria()[0].description(), "title");

    let query = criteria::SpecificationEvaluator::default()
        .get_query(criteria::MemoryQueryable::new(tickets()), &spec, false)
        .unwrap();
    assert_eq!(ids(query.to_list()), vec![4]);
}

#[test]
fn unknown_field_names_fail_the_build() {
    let err = Specification::<Ticket>::builder()
        .filter_clause("notes", Op::Eq, "x")
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        SpecificationError::InvalidArgument { argument: "field", .. }
    ));

    let err = Specification::<Ticket>::builder()
        .search_field("", "%", 1)
        .build()
        .unwrap_err();
    assert!(matches!(err, SpecificationError::ArgumentNull("field")));
}

#[test]
fn operator_must_fit_the_value() {
    let err = Specification::<Ticket>::builder()
        .filter_clause(Ticket::URGENT, Op::Gt, true)
        .build()
        .unwrap_err();
    assert_eq!(err.to_string(), "operator 'gt' is not valid for bool values");
}
