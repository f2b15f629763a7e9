use super::*;

#[test]
fn render_pads_columns_to_widest_cell() {
    std::env::set_var("NO_COLOR", "1");
    let mut table = Table::new(vec![Column::left("NAME"), Column::right("COUNT")]);
    table.row(vec!["t1".to_string(), "3".to_string()]);
    table.row(vec!["longer-name".to_string(), "10".to_string()]);

    let lines = table.render();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("NAME       "));
    assert!(lines[2].starts_with("longer-name"));
    std::env::remove_var("NO_COLOR");
}

#[test]
fn empty_table_renders_only_the_header() {
    std::env::set_var("NO_COLOR", "1");
    let table = Table::new(vec![Column::left("NAME")]);
    assert_eq!(table.render(), vec!["NAME".to_string()]);
    std::env::remove_var("NO_COLOR");
}
