//! Client quote workbook with a summary sheet and a line item detail sheet.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{
    Color, DocProperties, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};

use crate::view::{ClientQuoteView, LineRow};
use crate::ExportError;

pub const SUMMARY_SHEET: &str = "Quote Summary";
pub const LINE_ITEMS_SHEET: &str = "Line Items";

const BRAND_PRIMARY: Color = Color::RGB(0x1E3A5F);
const BRAND_LIGHT: Color = Color::RGB(0xE8F0F8);
const BRAND_ACCENT: Color = Color::RGB(0x2563EB);
const GRAY_LIGHT: Color = Color::RGB(0xF8FAFC);
const GRAY_BORDER: Color = Color::RGB(0xE2E8F0);
const MUTED: Color = Color::RGB(0x64748B);

const LINE_ITEM_HEADERS: [&str; 12] = [
    "Line Item",
    "Asset Type",
    "Description",
    "Size (sqm)",
    "Quantity",
    "Sustainability",
    "Security",
    "Sec. Channels",
    "Mobility",
    "Mob. Channels",
    "Insight",
    "Support",
];
const LINE_ITEM_WIDTHS: [f64; 12] = [25.0, 20.0, 28.0, 12.0, 10.0, 14.0, 10.0, 16.0, 10.0, 16.0, 10.0, 12.0];

pub fn render_workbook(view: &ClientQuoteView) -> Result<Vec<u8>, ExportError> {
    Ok(build_workbook(view)?.save_to_buffer()?)
}

fn build_workbook(view: &ClientQuoteView) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let title = format!("Client Quote {}", view.quote_name);
    let properties = DocProperties::new()
        .set_title(&title)
        .set_author(&view.company_name)
        .set_company(&view.company_name);
    workbook.set_properties(&properties);

    workbook.push_worksheet(summary_sheet(view)?);
    workbook.push_worksheet(line_items_sheet(view)?);
    Ok(workbook)
}

/// Rows of the summary sheet, top to bottom from the row under the banner.
#[derive(Clone, Debug, PartialEq)]
enum SummaryRow {
    Info(&'static str, String),
    Section(&'static str),
    Header([String; 3]),
    Data { cells: [String; 3], alternate: bool, bold: bool },
    Total { label: &'static str, value: String },
    Footer(String),
    Blank,
}

impl SummaryRow {
    fn data(cells: [&str; 3], alternate: bool) -> Self {
        Self::Data { cells: cells.map(str::to_string), alternate, bold: false }
    }

    fn bold(cells: [&str; 3]) -> Self {
        Self::Data { cells: cells.map(str::to_string), alternate: false, bold: true }
    }
}

fn summary_rows(view: &ClientQuoteView) -> Vec<SummaryRow> {
    use SummaryRow::*;

    let code = &view.currency_code;
    let header = |first: &str| {
        Header([
            first.to_string(),
            format!("Yearly Price ({code})"),
            format!("Total Commitment Price ({code})"),
        ])
    };
    let period = &view.commitment_label;

    let mut rows = vec![
        Blank,
        Info("Quote Name:", view.quote_name.clone()),
        Info("Date:", view.quote_date.clone()),
        Info("Client:", view.client_name.clone()),
        Info("Main Asset:", view.main_asset.clone()),
        Info("Commitment Period:", period.clone()),
        Info("Currency:", view.currency_label.clone()),
        Blank,
        Section("SELECTED MODULES"),
        header("Module"),
    ];
    for (index, module) in view.modules.iter().enumerate() {
        let (yearly, total) = if module.included {
            ("Included", "Included in subscription")
        } else {
            ("Not included", "-")
        };
        rows.push(SummaryRow::data([module.name, yearly, total], index % 2 == 1));
    }
    let support_label = format!("Support Plan ({})", view.support_plan);
    rows.push(SummaryRow::data([&support_label, "Included", "Included in subscription"], false));
    rows.push(Blank);

    rows.push(Section("ANNUAL PLATFORM FEE"));
    rows.push(header("Item"));
    rows.push(SummaryRow::data(
        [
            "Platform Subscription Fee",
            &view.platform_fee_yearly,
            &view.platform_fee_commitment_discounted,
        ],
        false,
    ));
    rows.push(Blank);

    rows.push(Section("QUOTE SUMMARY"));
    let platform_label = format!("Platform Fee ({period})");
    let subscription_label = format!("Subscription Total ({period})");
    rows.push(SummaryRow::data(
        [&platform_label, &view.platform_fee_yearly, &view.platform_fee_commitment_discounted],
        false,
    ));
    rows.push(SummaryRow::data(
        [&subscription_label, &view.subscription_yearly, &view.subscription_commitment_discounted],
        true,
    ));
    rows.push(SummaryRow::bold(["Total Price", &view.total_yearly, &view.total_before_discount]));
    if let Some(discount) = &view.discount {
        rows.push(SummaryRow::data([&discount.label, &discount.yearly, &discount.total], true));
    }
    rows.push(Blank);

    rows.push(Total { label: "EQUIVALENT AFTER DISCOUNT", value: view.final_total.clone() });
    rows.push(SummaryRow::bold(["Yearly Equivalent", &view.yearly_equivalent, ""]));
    rows.push(Blank);
    rows.push(Blank);
    rows.push(Footer(view.tax_note()));
    rows
}

fn summary_sheet(view: &ClientQuoteView) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(SUMMARY_SHEET)?;
    sheet.set_column_width(0, 45)?;
    sheet.set_column_width(1, 25)?;
    sheet.set_column_width(2, 25)?;

    let banner = Format::new()
        .set_bold()
        .set_font_size(20)
        .set_font_color(Color::White)
        .set_background_color(BRAND_PRIMARY)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    sheet.merge_range(0, 0, 0, 2, "CLIENT QUOTE", &banner)?;
    sheet.set_row_height(0, 40)?;

    for (offset, row) in summary_rows(view).iter().enumerate() {
        write_summary_row(&mut sheet, 1 + offset as u32, row)?;
    }
    Ok(sheet)
}

fn write_summary_row(sheet: &mut Worksheet, row: u32, content: &SummaryRow) -> Result<(), XlsxError> {
    let align = |col: usize| if col >= 1 { FormatAlign::Right } else { FormatAlign::Left };

    match content {
        SummaryRow::Blank => {}
        SummaryRow::Info(label, value) => {
            let label_format = Format::new().set_bold().set_font_color(BRAND_PRIMARY);
            sheet.write_string_with_format(row, 0, *label, &label_format)?;
            sheet.merge_range(row, 1, row, 2, value, &Format::new())?;
        }
        SummaryRow::Section(title) => {
            let format = Format::new()
                .set_bold()
                .set_font_size(12)
                .set_font_color(Color::White)
                .set_background_color(BRAND_ACCENT)
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter);
            sheet.merge_range(row, 0, row, 2, title, &format)?;
            sheet.set_row_height(row, 28)?;
        }
        SummaryRow::Header(headers) => {
            for (col, header) in headers.iter().enumerate() {
                let format = Format::new()
                    .set_bold()
                    .set_font_size(11)
                    .set_font_color(BRAND_PRIMARY)
                    .set_background_color(BRAND_LIGHT)
                    .set_border_bottom(FormatBorder::Medium)
                    .set_border_bottom_color(BRAND_PRIMARY)
                    .set_align(align(col));
                sheet.write_string_with_format(row, col as u16, header, &format)?;
            }
            sheet.set_row_height(row, 24)?;
        }
        SummaryRow::Data { cells, alternate, bold } => {
            for (col, value) in cells.iter().enumerate() {
                let mut format = Format::new()
                    .set_font_size(11)
                    .set_border_bottom(FormatBorder::Thin)
                    .set_border_bottom_color(GRAY_BORDER)
                    .set_align(align(col));
                if *bold {
                    format = format.set_bold();
                }
                if *alternate {
                    format = format.set_background_color(GRAY_LIGHT);
                }
                sheet.write_string_with_format(row, col as u16, value, &format)?;
            }
        }
        SummaryRow::Total { label, value } => {
            let highlight = Format::new()
                .set_bold()
                .set_font_size(14)
                .set_font_color(Color::White)
                .set_background_color(BRAND_PRIMARY)
                .set_align(FormatAlign::VerticalCenter);
            sheet.merge_range(row, 0, row, 1, label, &highlight)?;
            sheet.write_string_with_format(
                row,
                2,
                value,
                &highlight.clone().set_align(FormatAlign::Right),
            )?;
            sheet.set_row_height(row, 32)?;
        }
        SummaryRow::Footer(note) => {
            let footer = Format::new().set_italic().set_font_size(10).set_font_color(MUTED);
            sheet.merge_range(row, 0, row, 2, note, &footer)?;
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
enum LineCell {
    Text(String),
    Number(f64),
}

fn line_cells(line: &LineRow) -> [LineCell; 12] {
    let flag = |value: bool| LineCell::Text(if value { "Y" } else { "N" }.to_string());

    [
        LineCell::Text(line.label.clone()),
        LineCell::Text(line.asset.clone()),
        LineCell::Text(line.description.clone()),
        LineCell::Number(line.size.to_f64().unwrap_or(0.0)),
        LineCell::Number(f64::from(line.quantity)),
        flag(line.sustainability),
        flag(line.security),
        LineCell::Number(f64::from(line.security_channels)),
        flag(line.mobility),
        LineCell::Number(f64::from(line.mobility_channels)),
        flag(line.insight),
        LineCell::Text(line.support_plan.clone()),
    ]
}

fn line_items_sheet(view: &ClientQuoteView) -> Result<Worksheet, XlsxError> {
    let mut sheet = Worksheet::new();
    sheet.set_name(LINE_ITEMS_SHEET)?;
    for (col, width) in LINE_ITEM_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    let banner = Format::new()
        .set_bold()
        .set_font_size(20)
        .set_font_color(Color::White)
        .set_background_color(BRAND_PRIMARY)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let last_col = (LINE_ITEM_HEADERS.len() - 1) as u16;
    sheet.merge_range(0, 0, 0, last_col, "LINE ITEMS DETAIL", &banner)?;
    sheet.set_row_height(0, 40)?;

    let header = Format::new()
        .set_bold()
        .set_font_size(10)
        .set_font_color(Color::White)
        .set_background_color(BRAND_ACCENT)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border_bottom(FormatBorder::Medium)
        .set_border_bottom_color(BRAND_PRIMARY);
    for (col, title) in LINE_ITEM_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(2, col as u16, *title, &header)?;
    }
    sheet.set_row_height(2, 28)?;

    for (offset, line) in view.line_rows.iter().enumerate() {
        let row = 3 + offset as u32;
        let format = line_format(line, row % 2 == 1);
        for (col, cell) in line_cells(line).iter().enumerate() {
            match cell {
                LineCell::Text(text) => {
                    sheet.write_string_with_format(row, col as u16, text, &format)?
                }
                LineCell::Number(number) => {
                    sheet.write_number_with_format(row, col as u16, *number, &format)?
                }
            };
        }
    }

    Ok(sheet)
}

fn line_format(line: &LineRow, alternate: bool) -> Format {
    let mut format = Format::new()
        .set_font_size(10)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border_bottom(FormatBorder::Thin)
        .set_border_bottom_color(GRAY_BORDER)
        .set_border_left(FormatBorder::Thin)
        .set_border_left_color(GRAY_BORDER)
        .set_border_right(FormatBorder::Thin)
        .set_border_right_color(GRAY_BORDER);
    format = if line.is_child { format.set_italic() } else { format.set_bold() };
    if alternate {
        let fill = if line.is_child { Color::RGB(0xF0F4F8) } else { GRAY_LIGHT };
        format = format.set_background_color(fill);
    }
    format
}

#[cfg(test)]
mod tests {
    use super::{
        build_workbook, line_cells, render_workbook, summary_rows, LineCell, SummaryRow,
        LINE_ITEMS_SHEET, SUMMARY_SHEET,
    };
    use crate::view::tests::view_fixture;

    fn data_labels(rows: &[SummaryRow]) -> Vec<&str> {
        rows.iter()
            .filter_map(|row| match row {
                SummaryRow::Data { cells, .. } => Some(cells[0].as_str()),
                _ => None,
            })
            .collect()
    }

    fn text(cell: &LineCell) -> &str {
        match cell {
            LineCell::Text(text) => text,
            LineCell::Number(_) => "",
        }
    }

    #[test]
    fn workbook_renders_to_a_zip_buffer() {
        let bytes = render_workbook(&view_fixture(3, "AED")).expect("workbook");

        assert!(bytes.len() > 1000);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn workbook_has_summary_then_line_items_sheets() {
        let mut workbook = build_workbook(&view_fixture(3, "USD")).expect("workbook");

        let first = workbook.worksheet_from_index(0).expect("summary sheet").name();
        let second = workbook.worksheet_from_index(1).expect("line items sheet").name();
        assert_eq!(first, SUMMARY_SHEET);
        assert_eq!(second, LINE_ITEMS_SHEET);
    }

    #[test]
    fn summary_rows_list_modules_fees_and_discount() {
        let view = view_fixture(5, "USD");

        let rows = summary_rows(&view);

        assert_eq!(
            data_labels(&rows),
            [
                "Sustainability",
                "Security",
                "Mobility",
                "Insight",
                "Support Plan (16x5)",
                "Platform Subscription Fee",
                "Platform Fee (5 Years)",
                "Subscription Total (5 Years)",
                "Total Price",
                "Commitment Discount (25%)",
                "Yearly Equivalent",
            ]
        );
        assert!(rows.contains(&SummaryRow::Header([
            "Module".to_string(),
            "Yearly Price (USD)".to_string(),
            "Total Commitment Price (USD)".to_string(),
        ])));
        assert!(rows.contains(&SummaryRow::Total {
            label: "EQUIVALENT AFTER DISCOUNT",
            value: view.final_total.clone(),
        }));
        assert_eq!(rows.last(), Some(&SummaryRow::Footer(view.tax_note())));
    }

    #[test]
    fn one_year_summary_omits_the_discount_row() {
        let rows = summary_rows(&view_fixture(1, "USD"));

        assert!(!data_labels(&rows).iter().any(|label| label.starts_with("Commitment Discount")));
    }

    #[test]
    fn module_rows_mark_inclusion() {
        let rows = summary_rows(&view_fixture(1, "USD"));

        let security = SummaryRow::data(["Security", "Included", "Included in subscription"], true);
        assert!(rows.contains(&security));
        assert!(rows.contains(&SummaryRow::data(["Insight", "Not included", "-"], true)));
    }

    #[test]
    fn line_cells_use_yes_no_flags_and_indented_children() {
        let view = view_fixture(1, "USD");

        let parent = line_cells(&view.line_rows[0]);
        assert_eq!(text(&parent[0]), "Line Item 1");
        assert_eq!(parent[3], LineCell::Number(12000.5));
        assert_eq!(
            [&parent[5], &parent[6], &parent[8], &parent[10]].map(text),
            ["Y", "Y", "N", "N"]
        );
        assert_eq!(parent[7], LineCell::Number(6.0));

        let child = line_cells(&view.line_rows[2]);
        assert_eq!(text(&child[0]), "  └─ Sub 1");
        assert_eq!(text(&child[1]), "Port Terminal");
        assert_eq!(text(&child[8]), "Y");
        assert_eq!(child[9], LineCell::Number(2.0));
    }

    #[test]
    fn workbook_renders_quotes_without_line_items() {
        let mut view = view_fixture(1, "USD");
        view.line_rows.clear();
        view.discount = None;

        let bytes = render_workbook(&view).expect("workbook");

        assert_eq!(&bytes[..2], b"PK");
    }
}
