#![cfg(feature = "test-dom")]

use landing_behavior::config::StaggerConfig;
use landing_behavior::dom::memory::{MemoryDom, NodeId};
use landing_behavior::dom::Dom;
use landing_behavior::faq::{Accordion, CategoryState, ItemState};
use landing_behavior::timers::ManualScheduler;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

struct Faq {
    dom: MemoryDom,
    clock: ManualScheduler,
    accordion: Accordion<MemoryDom, ManualScheduler>,
    categories: Vec<NodeId>,
}

/// Categories as authors write them: a bare title followed by bare items.
fn raw_markup(dom: &MemoryDom, counts: &[usize]) -> Vec<NodeId> {
    let body = dom.body().unwrap();
    let section = dom.append(body, "section", "faq");
    counts
        .iter()
        .enumerate()
        .map(|(c, &items)| {
            let category = dom.append(section, "div", "faq-category");
            let title = dom.append(category, "h3", "faq-category-title");
            dom.set_text(&title, &format!("Category {}", c + 1));
            for i in 0..items {
                let item = dom.append(category, "div", "faq-item");
                let question = dom.append(item, "button", "faq-question");
                dom.set_text(&question, &format!("Question {}.{}", c + 1, i + 1));
                let answer = dom.append(item, "div", "faq-answer");
                dom.set_text(&answer, "Answer");
            }
            category
        })
        .collect()
}

fn faq(counts: &[usize]) -> Faq {
    let dom = MemoryDom::new();
    let clock = ManualScheduler::new();
    let categories = raw_markup(&dom, counts);
    let accordion = Accordion::init(dom.clone(), clock.clone(), StaggerConfig::default());
    Faq {
        dom,
        clock,
        accordion,
        categories,
    }
}

impl Faq {
    fn header(&self, category: usize) -> NodeId {
        self.dom
            .query(Some(&self.categories[category]), ".faq-category-header")
            .expect("header synthesized")
    }

    fn item(&self, category: usize, index: usize) -> NodeId {
        self.accordion.items(&self.categories[category])[index]
    }

    fn click_header(&self, category: usize) {
        self.dom.click(self.header(category));
    }

    fn click_question(&self, category: usize, index: usize) {
        let item = self.item(category, index);
        let question = self.dom.query(Some(&item), ".faq-question").unwrap();
        self.dom.click(question);
    }

    fn open_categories(&self) -> Vec<usize> {
        (0..self.categories.len())
            .filter(|c| self.dom.has_class(&self.categories[*c], "section-active"))
            .collect()
    }

    fn open_items(&self, category: usize) -> Vec<usize> {
        self.accordion
            .items(&self.categories[category])
            .iter()
            .enumerate()
            .filter(|(_, item)| self.dom.has_class(item, "active"))
            .map(|(i, _)| i)
            .collect()
    }
}

#[test]
fn synthesis_wraps_title_and_items() {
    let faq = faq(&[2, 3]);
    let dom = &faq.dom;

    for (c, category) in faq.categories.iter().enumerate() {
        let children = dom.children(category);
        assert_eq!(children.len(), 2, "header + content");
        assert!(dom.has_class(&children[0], "faq-category-header"));
        assert!(dom.has_class(&children[1], "faq-category-content"));

        let header_parts = dom.children(&children[0]);
        assert!(dom.has_class(&header_parts[0], "faq-category-title"));
        assert!(dom.has_class(&header_parts[1], "category-icon"));
        assert_eq!(dom.text(&header_parts[1]), "▼");

        let items = dom.children(&children[1]);
        for (i, item) in items.iter().enumerate() {
            assert!(dom.has_class(item, "faq-item"));
            assert_eq!(dom.text(item), format!("Question {}.{}Answer", c + 1, i + 1));
            assert_eq!(dom.style(*item, "--i"), Some(i.to_string()));
        }
    }
}

#[test]
fn synthesis_is_idempotent() {
    let faq = faq(&[2, 3, 1]);
    faq.accordion.synthesize();
    faq.accordion.synthesize();

    for category in &faq.categories {
        assert_eq!(faq.dom.query_all(Some(category), ".faq-category-header").len(), 1);
        assert_eq!(faq.dom.query_all(Some(category), ".faq-category-content").len(), 1);
        assert_eq!(faq.dom.query_all(Some(category), ".category-icon").len(), 1);
    }
    assert_eq!(faq.dom.count(".faq-item"), 6);
}

#[test]
fn existing_structure_is_left_alone() {
    let dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let category = dom.append(body, "div", "faq-category");
    let header = dom.append(category, "div", "faq-category-header");
    let title = dom.append(header, "h2", "");
    dom.set_text(&title, "Pagos");
    let content = dom.append(category, "div", "faq-category-content");
    let item = dom.append(content, "div", "faq-item");
    dom.append(item, "button", "faq-question");

    let accordion = Accordion::new(dom.clone(), ManualScheduler::new(), StaggerConfig::default());
    assert_eq!(accordion.synthesize(), 1);
    assert_eq!(dom.children(&category), vec![header, content]);
    assert_eq!(dom.children(&header), vec![title]);
}

#[test]
fn heading_inside_an_answer_is_not_a_title() {
    let dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let category = dom.append(body, "div", "faq-category");
    let item = dom.append(category, "div", "faq-item");
    dom.append(item, "button", "faq-question");
    let answer = dom.append(item, "div", "faq-answer");
    dom.append(answer, "h3", "");

    let accordion = Accordion::new(dom.clone(), ManualScheduler::new(), StaggerConfig::default());
    accordion.synthesize();

    assert!(dom.query(Some(&category), ".faq-category-header").is_none());
    let children = dom.children(&category);
    assert_eq!(children.len(), 1);
    assert!(dom.has_class(&children[0], "faq-category-content"));
}

#[test]
fn category_without_items_gets_no_content_wrapper() {
    let dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let category = dom.append(body, "div", "faq-category");
    dom.append(category, "h4", "");

    let accordion = Accordion::new(dom.clone(), ManualScheduler::new(), StaggerConfig::default());
    accordion.synthesize();

    assert_eq!(dom.query_all(Some(&category), ".faq-category-header").len(), 1);
    assert!(dom.query(Some(&category), ".faq-category-content").is_none());
}

#[test]
fn opening_category_then_item() {
    let faq = faq(&[2, 3, 1]);
    faq.click_header(1);
    faq.click_question(1, 1);

    assert_eq!(faq.open_categories(), vec![1]);
    assert_eq!(faq.open_items(0), Vec::<usize>::new());
    assert_eq!(faq.open_items(1), vec![1]);
    assert_eq!(faq.open_items(2), Vec::<usize>::new());
    assert_eq!(
        faq.accordion.category_state(&faq.categories[1]),
        CategoryState::Expanded
    );
    assert_eq!(faq.accordion.item_state(&faq.item(1, 1)), ItemState::Open);
}

#[test]
fn header_click_toggles_and_excludes_others() {
    let faq = faq(&[1, 1, 1]);
    faq.click_header(0);
    assert_eq!(faq.open_categories(), vec![0]);
    faq.click_header(2);
    assert_eq!(faq.open_categories(), vec![2]);
    faq.click_header(2);
    assert!(faq.open_categories().is_empty());
}

#[test]
fn clicks_inside_header_bubble_to_it() {
    let faq = faq(&[1]);
    let title = faq
        .dom
        .query(Some(&faq.categories[0]), ".faq-category-title")
        .unwrap();
    faq.dom.click(title);
    assert_eq!(faq.open_categories(), vec![0]);
}

#[test]
fn item_click_is_exclusive_and_closes_itself() {
    let faq = faq(&[3]);
    faq.click_question(0, 0);
    assert_eq!(faq.open_items(0), vec![0]);
    faq.click_question(0, 2);
    assert_eq!(faq.open_items(0), vec![2]);
    faq.click_question(0, 2);
    assert!(faq.open_items(0).is_empty());
}

#[test]
fn closing_a_category_keeps_its_open_item_flag() {
    let faq = faq(&[2, 2]);
    faq.click_header(1);
    faq.click_question(1, 0);

    faq.click_header(0);
    assert_eq!(faq.open_categories(), vec![0]);
    assert_eq!(faq.open_items(1), vec![0]);

    faq.click_header(1);
    assert_eq!(faq.open_items(1), vec![0]);
}

#[test]
fn items_in_other_categories_are_independent() {
    let faq = faq(&[2, 2]);
    faq.click_question(0, 1);
    faq.click_question(1, 0);
    assert_eq!(faq.open_items(0), vec![1]);
    assert_eq!(faq.open_items(1), vec![0]);
}

#[test]
fn random_click_sequences_keep_invariants() {
    let faq = faq(&[2, 3, 1, 4]);
    let counts = [2usize, 3, 1, 4];
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..500 {
        let category = rng.gen_range(0..counts.len());
        if rng.gen_bool(0.5) {
            faq.click_header(category);
        } else {
            faq.click_question(category, rng.gen_range(0..counts[category]));
        }
        assert!(faq.open_categories().len() <= 1);
        for c in 0..counts.len() {
            assert!(faq.open_items(c).len() <= 1);
        }
    }
}

#[test]
fn opening_staggers_items() {
    let faq = faq(&[3]);
    let items: Vec<NodeId> = (0..3).map(|i| faq.item(0, i)).collect();
    let reads_before = faq.dom.layout_reads();

    faq.click_header(0);
    assert_eq!(faq.dom.layout_reads() - reads_before, 3);
    for item in &items {
        assert_eq!(faq.dom.style(*item, "opacity").as_deref(), Some("0"));
        assert_eq!(
            faq.dom.style(*item, "transform").as_deref(),
            Some("translateY(10px)")
        );
    }
    assert_eq!(faq.clock.pending(), 3);

    faq.clock.advance(60);
    assert_eq!(faq.dom.style(items[0], "opacity"), None);
    assert_eq!(faq.dom.style(items[0], "transform"), None);
    assert_eq!(faq.dom.style(items[1], "opacity").as_deref(), Some("0"));

    faq.clock.advance(80);
    assert_eq!(faq.dom.style(items[1], "opacity"), None);
    assert_eq!(faq.dom.style(items[2], "opacity").as_deref(), Some("0"));

    faq.clock.advance(80);
    assert_eq!(faq.dom.style(items[2], "opacity"), None);
    assert_eq!(faq.clock.pending(), 0);
}

#[test]
fn collapsing_schedules_nothing() {
    let faq = faq(&[2]);
    faq.click_header(0);
    faq.clock.advance(1_000);
    faq.click_header(0);
    assert_eq!(faq.clock.pending(), 0);
}

#[test]
fn opening_restamps_indices() {
    let faq = faq(&[3]);
    let content = faq
        .dom
        .query(Some(&faq.categories[0]), ".faq-category-content")
        .unwrap();
    let last = faq.item(0, 2);
    let first = faq.item(0, 0);
    faq.dom.insert_before(&content, &last, Some(&first));

    faq.click_header(0);
    assert_eq!(faq.dom.style(last, "--i").as_deref(), Some("0"));
    assert_eq!(faq.dom.style(first, "--i").as_deref(), Some("1"));
}

#[test]
fn header_outside_category_is_ignored() {
    let dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let stray = dom.append(body, "div", "faq-category-header");
    let accordion = Accordion::init(dom.clone(), ManualScheduler::new(), StaggerConfig::default());

    assert_eq!(accordion.on_header_click(&stray), None);
    dom.click(stray);
    assert_eq!(dom.count(".section-active"), 0);
}

#[test]
fn item_outside_category_toggles_alone() {
    let dom = MemoryDom::new();
    let body = dom.body().unwrap();
    let item = dom.append(body, "div", "faq-item");
    let question = dom.append(item, "button", "faq-question");
    let accordion = Accordion::init(dom.clone(), ManualScheduler::new(), StaggerConfig::default());

    dom.click(question);
    assert_eq!(accordion.item_state(&item), ItemState::Open);
    dom.click(question);
    assert_eq!(accordion.item_state(&item), ItemState::Closed);
}
