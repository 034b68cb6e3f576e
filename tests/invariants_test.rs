//! Properties every conversion must hold, whatever the page looks like.

use bookxml::emit::{DocumentTree, Node};
use bookxml::model::{BoundingBox, Document, Drawing, Fragment, Media, Page, Segment, Table, TableCell, TableRow};
use bookxml::{JsonFormat, Pipeline};

fn frag(text: &str, x0: f32, y0: f32, x1: f32) -> Fragment {
    Fragment::new(text, BoundingBox::new(x0, y0, x1, y0 + 11.0), "Times", 11.0)
}

fn ruled_table(id: &str, y: f32) -> (Table, Drawing, Vec<Fragment>) {
    let texts = [["Site", "Cases"], ["North", "14"], ["South", "9"]];
    let mut rows = Vec::new();
    let mut fragments = Vec::new();
    for (r, row) in texts.iter().enumerate() {
        let top = y + r as f32 * 20.0;
        let mut cells = Vec::new();
        for (c, text) in row.iter().enumerate() {
            let x = 80.0 + c as f32 * 200.0;
            cells.push(TableCell::new(BoundingBox::new(x, top, x + 180.0, top + 14.0), *text));
            fragments.push(frag(text, x + 2.0, top + 2.0, x + 50.0));
        }
        rows.push(TableRow::new(cells));
    }
    let bottom = y + 60.0;
    let drawing = Drawing::stroke(vec![
        Segment::new(78.0, y - 2.0, 482.0, y - 2.0),
        Segment::new(78.0, y + 18.0, 482.0, y + 18.0),
        Segment::new(78.0, bottom, 482.0, bottom),
        Segment::new(78.0, y - 2.0, 78.0, bottom),
        Segment::new(482.0, y - 2.0, 482.0, bottom),
    ]);
    let table = Table::new(id, BoundingBox::new(75.0, y - 5.0, 485.0, bottom + 3.0), rows);
    (table, drawing, fragments)
}

/// A small book touching most node kinds.
fn sample_book() -> Document {
    let mut doc = Document::new("978-1-23-456789-7");

    let mut first = Page::letter(0);
    first.add_fragment(Fragment::new("1 Introduction", BoundingBox::new(72.0, 60.0, 400.0, 78.0), "Times", 18.0).bold());
    first.add_fragment(frag("Radiographs are read in a fixed order so that no", 72.0, 100.0, 540.0));
    first.add_fragment(frag("region of the film is overlooked.", 72.0, 113.0, 300.0));
    first.add_fragment(frag("• Check the patient details", 90.0, 140.0, 300.0));
    first.add_fragment(frag("• Confirm the projection", 90.0, 153.0, 300.0));
    first.add_media(Media::new("p1_img1", BoundingBox::new(100.0, 200.0, 400.0, 400.0), "p1_img1.png"));
    first.add_fragment(frag("Figure 1. Normal chest radiograph", 100.0, 410.0, 320.0));
    let (table, drawing, cells) = ruled_table("p1_table1", 480.0);
    first.add_table(table);
    first.drawings.push(drawing);
    for cell in cells {
        first.add_fragment(cell);
    }
    first.add_fragment(frag("Counts are per thousand studies.", 72.0, 600.0, 320.0));
    doc.add_page(first);

    let mut second = Page::letter(1);
    second.add_fragment(frag("Left column text about the lungs", 72.0, 100.0, 290.0));
    second.add_fragment(frag("and the heart borders.", 72.0, 113.0, 200.0));
    second.add_fragment(frag("Right column text about bones", 322.0, 100.0, 540.0));
    second.add_fragment(frag("and soft tissue.", 322.0, 113.0, 420.0));
    doc.add_page(second);

    doc
}

fn squash(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn same_input_gives_identical_output() {
    let pipeline = Pipeline::default();
    let a = pipeline.run(&mut sample_book());
    let b = pipeline.run(&mut sample_book());

    assert_eq!(a.xml, b.xml);
    assert_eq!(
        a.report_json(JsonFormat::Pretty).unwrap(),
        b.report_json(JsonFormat::Pretty).unwrap()
    );
}

/// Fragments that reach the text flow, in reading order.
fn flowing_text(doc: &Document) -> String {
    let mut text = String::new();
    for page in &doc.pages {
        for block in page.ordered_blocks() {
            for line in &block.lines {
                for id in &page.line(*line).fragments {
                    text.push_str(&page.fragment(*id).text);
                }
            }
        }
    }
    squash(&text)
}

/// Fragments held back for tables, in extraction order.
fn excluded_text(doc: &Document) -> String {
    let mut text = String::new();
    for page in &doc.pages {
        for id in &page.excluded {
            text.push_str(&page.fragment(*id).text);
        }
    }
    squash(&text)
}

/// Emitted running text outside tables, and emitted table cells.
fn emitted_text(tree: &DocumentTree) -> (String, String) {
    let mut running = String::new();
    let mut cells = String::new();
    tree.walk(&mut |node, _| match node {
        Node::Section(s) => running.push_str(&s.title),
        Node::Paragraph(p) => running.push_str(&p.text),
        Node::List(l) => l.items.iter().for_each(|i| running.push_str(i)),
        Node::Figure(f) => running.push_str(&f.title),
        Node::Equation(e) => running.push_str(&e.text),
        Node::Table(t) => t.header.iter().chain(&t.body).flatten().for_each(|c| cells.push_str(c)),
        Node::Diagnostic(_) => {}
    });
    (squash(&running), squash(&cells))
}

#[test]
fn flowing_text_is_never_lost() {
    let mut doc = sample_book();
    let out = Pipeline::default().run(&mut doc);
    let (running, cells) = emitted_text(&out.tree);

    assert_eq!(running, flowing_text(&doc));
    assert_eq!(cells, excluded_text(&doc));
    assert!(running.starts_with("1Introduction"));
    assert!(running.ends_with("andsofttissue."));
}

#[test]
fn partial_ruling_keeps_cells_in_the_table_only() {
    let texts = [["Site", "Cases"], ["North", "14"]];
    let mut page = Page::letter(0);
    let mut rows = Vec::new();
    let mut fragments = Vec::new();
    for (r, row) in texts.iter().enumerate() {
        let top = 400.0 + r as f32 * 20.0;
        let mut cells = Vec::new();
        for (c, text) in row.iter().enumerate() {
            let x = 80.0 + c as f32 * 200.0;
            cells.push(TableCell::new(BoundingBox::new(x, top, x + 180.0, top + 14.0), *text));
            fragments.push(frag(text, x + 2.0, top + 2.0, x + 50.0));
        }
        rows.push(TableRow::new(cells));
    }
    page.add_table(Table::new("p1_table1", BoundingBox::new(75.0, 295.0, 485.0, 480.0), rows));
    // a ruled box in the top corner of the candidate, clear of every row
    page.drawings.push(Drawing::stroke(vec![
        Segment::new(78.0, 300.0, 300.0, 300.0),
        Segment::new(78.0, 340.0, 300.0, 340.0),
        Segment::new(78.0, 300.0, 78.0, 340.0),
        Segment::new(300.0, 300.0, 300.0, 340.0),
    ]));
    for fragment in fragments {
        page.add_fragment(fragment);
    }
    page.add_fragment(frag("Body text follows the table.", 72.0, 520.0, 300.0));
    let mut doc = Document::new("id");
    doc.add_page(page);

    let out = Pipeline::default().run(&mut doc);
    let content = out.tree.text_content();
    for cell in ["Site", "Cases", "North", "14"] {
        let seen = content.iter().filter(|t| t.split_whitespace().any(|w| w == cell)).count();
        assert_eq!(seen, 1, "cell {:?} emitted {} times", cell, seen);
    }
    assert_eq!(out.stats().tables_has_structure, 1);
    assert_eq!(doc.pages[0].excluded.len(), 4);

    let (running, cells) = emitted_text(&out.tree);
    assert_eq!(running, "Bodytextfollowsthetable.");
    assert_eq!(cells, "SiteCasesNorth14");
}

#[test]
fn control_characters_never_reach_the_xml() {
    let mut page = Page::letter(0);
    page.add_fragment(frag("Alpha\u{0002}beta\u{0000} and more text.", 72.0, 100.0, 400.0));
    let mut doc = Document::new("id\u{0007}");
    doc.add_page(page);

    let out = Pipeline::default().run(&mut doc);
    assert!(out.xml.contains("Alphabeta and more text."));
    assert!(!out
        .xml
        .chars()
        .any(|c| c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')));
}

#[test]
fn rerunning_on_the_same_document_is_stable() {
    let texts = [["Table 2. Cases by site", ""], ["Site", "Cases"], ["North", "14"], ["South", "9"]];
    let mut page = Page::letter(0);
    let mut rows = Vec::new();
    for (r, row) in texts.iter().enumerate() {
        let top = 300.0 + r as f32 * 20.0;
        let mut cells = Vec::new();
        for (c, text) in row.iter().enumerate() {
            let x = 80.0 + c as f32 * 200.0;
            cells.push(TableCell::new(BoundingBox::new(x, top, x + 180.0, top + 14.0), *text));
            if !text.is_empty() {
                page.add_fragment(frag(text, x + 2.0, top + 2.0, x + 150.0));
            }
        }
        rows.push(TableRow::new(cells));
    }
    page.add_table(Table::new("p1_table1", BoundingBox::new(75.0, 295.0, 485.0, 385.0), rows));
    page.add_fragment(frag("Body text follows the table.", 72.0, 420.0, 300.0));
    let mut doc = Document::new("id");
    doc.add_page(page);

    let pipeline = Pipeline::default();
    let first = pipeline.run(&mut doc);
    let table = doc.pages[0].tables[0].clone();
    let second = pipeline.run(&mut doc);

    assert_eq!(first.xml, second.xml);
    assert_eq!(first.report.diagnostics.len(), second.report.diagnostics.len());
    assert_eq!(second.xml.matches("role=\"table_rows_trimmed\"").count(), 1);
    assert_eq!(doc.pages[0].tables[0], table);
    assert_eq!(table.rows[0].cells[0].text, "Site");
}

#[test]
fn table_cells_stay_out_of_running_text() {
    let out = Pipeline::default().run(&mut sample_book());

    let mut paragraphs = Vec::new();
    out.tree.walk(&mut |node, _| {
        if let Node::Paragraph(p) = node {
            paragraphs.push(p.text.clone());
        }
    });
    for cell in ["Site", "Cases", "North", "South", "14"] {
        assert!(
            paragraphs.iter().all(|p| !p.split_whitespace().any(|w| w == cell)),
            "cell {:?} leaked into a paragraph",
            cell
        );
    }
    assert_eq!(out.stats().tables_has_structure, 1);
}

#[test]
fn node_kinds_are_all_present() {
    let out = Pipeline::default().run(&mut sample_book());
    let stats = out.stats();

    assert_eq!(stats.page_count, 2);
    assert_eq!(stats.heading_count, 1);
    assert_eq!(stats.list_count, 1);
    assert_eq!(stats.list_item_count, 2);
    assert_eq!(stats.figure_count, 1);
    assert!(out.xml.contains("<title>Figure 1. Normal chest radiograph</title>"));
    assert!(out.xml.contains("<itemizedlist>"));
}

#[test]
fn full_width_block_splits_column_bands() {
    let mut page = Page::letter(0);
    page.add_fragment(frag("Upper left block.", 72.0, 100.0, 290.0));
    page.add_fragment(frag("Upper right block.", 322.0, 100.0, 540.0));
    page.add_fragment(frag("A spanning paragraph runs across both columns of the page here.", 72.0, 200.0, 540.0));
    page.add_fragment(frag("Lower left block.", 72.0, 260.0, 290.0));
    page.add_fragment(frag("Lower right block.", 322.0, 260.0, 540.0));
    let mut doc = Document::new("id");
    doc.add_page(page);

    let out = Pipeline::default().run(&mut doc);
    let order: Vec<String> = out.tree.text_content();
    assert_eq!(
        order,
        vec![
            "Upper left block.",
            "Upper right block.",
            "A spanning paragraph runs across both columns of the page here.",
            "Lower left block.",
            "Lower right block.",
        ]
    );
}

#[test]
fn text_inside_a_table_never_becomes_a_heading() {
    let (table, drawing, mut cells) = ruled_table("p1_table1", 300.0);
    cells[0] = Fragment::new("Site", BoundingBox::new(82.0, 302.0, 130.0, 320.0), "Times", 18.0).bold();

    let mut page = Page::letter(0);
    page.add_table(table);
    page.drawings.push(drawing);
    for cell in cells {
        page.add_fragment(cell);
    }
    page.add_fragment(frag("Body text follows the table.", 72.0, 420.0, 300.0));
    let mut doc = Document::new("id");
    doc.add_page(page);

    let out = Pipeline::default().run(&mut doc);
    assert_eq!(out.stats().heading_count, 0);
    assert!(!out.xml.contains("<section"));
    assert!(out.xml.contains("<entry>Site</entry>"));
}

#[test]
fn empty_document_still_yields_a_book() {
    let out = Pipeline::default().run(&mut Document::new("blank"));
    assert!(out.xml.contains("<book id=\"blank\" pages=\"0\""));
    assert_eq!(out.stats().diagnostic_count, 0);
    assert!(out.report.diagnostics.is_empty());
}
