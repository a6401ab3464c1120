use std::iter;
use std::ops::Range;

use civmap_core::{
    BoundaryFeature, Bounds, DistrictFilter, ExportFormat, Facility, FacilityType, FacilityView,
    HeatPoint, SearchOutcome, star_string,
};
use ratatui::{
    prelude::*,
    symbols::Marker,
    widgets::{
        Bar, BarChart, BarGroup, Block, Borders, Cell, List, ListItem, ListState, Paragraph, Row,
        Table, TableState, Wrap,
        canvas::{Canvas, Line as CanvasLine, Points},
    },
};

use crate::app::{App, NEARBY_COUNT, Screen};

/// Outline colour of unselected district boundaries.
const BOUNDARY_COLOR: Color = Color::Rgb(255, 120, 0);

pub(crate) fn draw(frame: &mut Frame<'_>, app: &App) {
    let area = frame.area();

    // Outer layout: title, main content, status line
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [header_area, content_area, status_area] = chunks else {
        return;
    };

    let dataset = app.service.dataset();
    let header = Paragraph::new(format!(
        "{} · {} of {} facilities visible · {} active filters",
        dataset.description,
        app.visible().len(),
        app.service.facilities().len(),
        app.service.filter().active_filter_count()
    ))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(dataset.name.as_str()),
    );
    frame.render_widget(header, *header_area);

    match app.screen {
        Screen::Facilities => draw_facilities(frame, app, *content_area),
        Screen::Search => draw_search(frame, app, *content_area),
        Screen::Analytics => draw_analytics(frame, app, *content_area),
        Screen::Map => draw_map(frame, app, *content_area),
        Screen::Details => draw_details(frame, app, *content_area),
        Screen::Export => draw_export(frame, app, *content_area),
        Screen::Upload => draw_upload(frame, app, *content_area),
    }

    let nav_hint = match app.screen {
        Screen::Facilities => {
            "↑/↓ move · Enter details · l like · 1-8 types · a all · d district · r reset · / search · s stats · m map · e export · u upload · q quit"
        }
        Screen::Search => "Type to get suggestions · Enter search · ↑/↓ move · Tab details · Esc back",
        Screen::Analytics => "Esc/←/b back · q quit",
        Screen::Map => "d/Tab next district · a all districts · h heatmap · Esc/←/b back · q quit",
        Screen::Details => "l like · Esc/←/b back · q quit",
        Screen::Export => "↑/↓ choose format · Enter write file · Esc/←/b back · q quit",
        Screen::Upload => "Type a GeoJSON path · Enter add boundary · Esc back",
    };

    let (status_text, status_style) = match &app.status {
        Some(status) => (
            format!("[{}] {} · {nav_hint}", status.at.format("%H:%M:%S"), status.text),
            if status.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Green)
            },
        ),
        None => (nav_hint.to_owned(), Style::default()),
    };

    let status = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(status_style)
        .wrap(Wrap { trim: true });

    frame.render_widget(status, *status_area);
}

fn type_color(kind: FacilityType) -> Color {
    let (red, green, blue) = kind.marker_style().rgb();
    Color::Rgb(red, green, blue)
}

fn district_label(app: &App) -> String {
    match app.service.filter().district() {
        DistrictFilter::All => "All districts".to_owned(),
        DistrictFilter::Named(name) => name.clone(),
    }
}

fn like_label(facility: &Facility) -> String {
    let heart = if facility.liked { "♥" } else { "♡" };
    format!("{heart} {}", facility.likes)
}

fn draw_facilities(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [chips_area, table_area] = chunks else {
        return;
    };

    let filter = app.service.filter();
    let chips: Vec<Span<'_>> = FacilityType::CANONICAL_ORDER
        .iter()
        .enumerate()
        .map(|(position, kind)| {
            let enabled = filter.is_type_enabled(*kind);
            let mark = if enabled { "■" } else { "□" };
            let style = if enabled {
                Style::default().fg(type_color(*kind))
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!("{} {mark} {}  ", position + 1, kind.label()), style)
        })
        .collect();
    let chips = Paragraph::new(Line::from(chips))
        .block(Block::default().borders(Borders::ALL).title("Facility types"))
        .wrap(Wrap { trim: true });
    frame.render_widget(chips, *chips_area);

    let visible = app.visible();
    let rows = visible.iter().map(|facility| {
        Row::new(vec![
            Cell::from(facility.name.clone()),
            Cell::from(facility.kind.label()).style(Style::default().fg(type_color(facility.kind))),
            Cell::from(facility.district.clone()),
            Cell::from(facility.rating.map_or_else(|| "-".to_owned(), star_string)),
            Cell::from(like_label(facility)),
        ])
    });

    let column_widths = [
        Constraint::Min(30),
        Constraint::Length(15),
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, column_widths)
        .header(
            Row::new(vec!["Name", "Type", "District", "Rating", "Likes"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Facilities in {}", district_label(app))),
        )
        .row_highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .column_spacing(1);

    let mut state = TableState::default();
    if !visible.is_empty() {
        state.select(Some(app.table_index));
    }
    frame.render_stateful_widget(table, *table_area, &mut state);
}

/// Name with the matched byte ranges emphasised.
fn highlighted(name: &str, ranges: &[Range<usize>]) -> Vec<Span<'static>> {
    let emphasis = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    let mut cursor = 0;
    for range in ranges {
        if let (Some(before), Some(matched)) = (name.get(cursor..range.start), name.get(range.clone())) {
            spans.push(Span::raw(before.to_owned()));
            spans.push(Span::styled(matched.to_owned(), emphasis));
            cursor = range.end;
        }
    }
    spans.push(Span::raw(name.get(cursor..).unwrap_or_default().to_owned()));
    spans
}

fn search_item(facility: &Facility, name: Vec<Span<'static>>) -> ListItem<'static> {
    let mut spans = name;
    spans.push(Span::styled(
        format!("  {} · {}", facility.kind.label(), facility.district),
        Style::default().fg(Color::DarkGray),
    ));
    ListItem::new(Line::from(spans))
}

fn draw_search(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // input
            Constraint::Min(0),    // results
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, results_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.search_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search by name or type (Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let ranked = if app.results.is_empty() {
        None
    } else {
        match app.service.search() {
            Ok(SearchOutcome::Ranked(hits)) => Some(hits),
            _ => None,
        }
    };

    let (title, items): (&str, Vec<ListItem<'_>>) = match ranked {
        Some(hits) => (
            "Results",
            hits.iter()
                .take(app.results.len())
                .map(|hit| search_item(hit.facility, highlighted(&hit.facility.name, &hit.highlights)))
                .collect(),
        ),
        None => (
            if app.results.is_empty() { "Suggestions" } else { "Results" },
            app.search_list()
                .iter()
                .filter_map(|id| app.service.facility(id))
                .map(|facility| search_item(facility, vec![Span::raw(facility.name.clone())]))
                .collect(),
        ),
    };

    let items = if items.is_empty() {
        vec![ListItem::new("Type at least two characters for suggestions.")]
    } else {
        items
    };

    let has_entries = !app.search_list().is_empty();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    if has_entries {
        state.select(Some(app.result_index));
    }
    frame.render_stateful_widget(list, *results_area, &mut state);
}

fn as_bar_value(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

fn draw_analytics(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
        ])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [summary_area, charts_area, comparison_area] = chunks else {
        return;
    };

    let summary = app.service.summary();
    let cards = Paragraph::new(format!(
        "Facilities: {}   Districts: {}   Types: {}   Average rating: {:.1}",
        summary.total, summary.districts, summary.types, summary.average_rating
    ))
    .block(Block::default().borders(Borders::ALL).title("Summary"));
    frame.render_widget(cards, *summary_area);

    let chart_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(*charts_area);
    let [types_area, districts_area] = chart_chunks.as_ref() else {
        return;
    };

    let type_bars: Vec<Bar<'_>> = app
        .service
        .count_by_type()
        .into_iter()
        .map(|(kind, count)| {
            Bar::default()
                .label(Line::from(kind.label()))
                .value(as_bar_value(count))
                .style(Style::default().fg(type_color(kind)))
        })
        .collect();
    let types_chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Facilities by type"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&type_bars));
    frame.render_widget(types_chart, *types_area);

    let district_bars: Vec<Bar<'_>> = app
        .service
        .count_by_district()
        .into_iter()
        .map(|(district, count)| {
            Bar::default()
                .label(Line::from(district))
                .value(as_bar_value(count))
                .style(Style::default().fg(Color::Cyan))
        })
        .collect();
    let districts_chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title("Facilities by district"))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&district_bars));
    frame.render_widget(districts_chart, *districts_area);

    let matrix = app.service.comparison();
    let header: Vec<String> = iter::once("Type".to_owned())
        .chain(matrix.districts.iter().cloned())
        .collect();
    let rows = matrix.types.iter().zip(&matrix.counts).map(|(kind, counts)| {
        let cells = iter::once(Cell::from(kind.label()).style(Style::default().fg(type_color(*kind))))
            .chain(counts.iter().map(|count| Cell::from(count.to_string())));
        Row::new(cells.collect::<Vec<_>>())
    });
    let widths: Vec<Constraint> = iter::once(Constraint::Length(15))
        .chain(matrix.districts.iter().map(|_| Constraint::Length(9)))
        .collect();
    let comparison = Table::new(rows, widths)
        .header(Row::new(header).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title("Type by district"))
        .column_spacing(1);
    frame.render_widget(comparison, *comparison_area);
}

fn heat_color(point: &HeatPoint) -> Color {
    match point.intensity {
        weight if weight >= 0.9 => Color::Red,
        weight if weight >= 0.7 => Color::LightRed,
        weight if weight >= 0.6 => Color::Yellow,
        _ => Color::Green,
    }
}

fn map_bounds(app: &App) -> Bounds {
    let center = app.service.map_settings().center;
    app.service
        .selected_district()
        .and_then(BoundaryFeature::bounds)
        .or_else(|| app.service.districts().bounds())
        .or_else(|| app.service.visible_bounds())
        .unwrap_or(Bounds {
            south: center.lat - 0.3,
            west: center.lon - 0.3,
            north: center.lat + 0.3,
            east: center.lon + 0.3,
        })
        .padded(0.05, 0.01)
}

fn draw_map(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(32)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [map_area, legend_area] = chunks else {
        return;
    };

    let bounds = map_bounds(app);
    let selected_key = app.service.selected_district().map(BoundaryFeature::key);
    let visible = app.visible();
    let heat = if app.show_heat {
        app.service.heat_points()
    } else {
        Vec::new()
    };
    let mode = if app.show_heat { "heatmap" } else { "markers" };

    let canvas = Canvas::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Map · {} · {mode}", district_label(app))),
        )
        .marker(Marker::Braille)
        .x_bounds([bounds.west, bounds.east])
        .y_bounds([bounds.south, bounds.north])
        .paint(|ctx| {
            for feature in app.service.districts().iter() {
                let selected = selected_key.as_deref() == Some(feature.key().as_str());
                let color = if selected { Color::Yellow } else { BOUNDARY_COLOR };
                for ring in feature.rings() {
                    for pair in ring.windows(2) {
                        if let [from, to] = pair {
                            ctx.draw(&CanvasLine::new(from.lon, from.lat, to.lon, to.lat, color));
                        }
                    }
                }
            }
            ctx.layer();

            if app.show_heat {
                for point in &heat {
                    ctx.draw(&Points {
                        coords: &[(point.position.lon, point.position.lat)],
                        color: heat_color(point),
                    });
                }
            } else {
                for kind in FacilityType::CANONICAL_ORDER {
                    let coords: Vec<(f64, f64)> = visible
                        .iter()
                        .filter(|facility| facility.kind == kind)
                        .map(|facility| (facility.coordinates.lon, facility.coordinates.lat))
                        .collect();
                    ctx.draw(&Points {
                        coords: &coords,
                        color: type_color(kind),
                    });
                }
            }
            ctx.layer();

            for feature in app.service.districts().iter() {
                if let Some(center) = feature.bounds().map(|extent| extent.center()) {
                    ctx.print(
                        center.lon,
                        center.lat,
                        Span::styled(feature.name.clone(), Style::default().fg(Color::White)),
                    );
                }
            }
        });
    frame.render_widget(canvas, *map_area);

    let mut lines: Vec<Line<'_>> = FacilityType::CANONICAL_ORDER
        .iter()
        .map(|kind| {
            let count = visible.iter().filter(|facility| facility.kind == *kind).count();
            Line::from(vec![
                Span::styled("● ", Style::default().fg(type_color(*kind))),
                Span::raw(format!("{} ({count})", kind.label())),
            ])
        })
        .collect();

    if let Some(feature) = app.service.selected_district() {
        let info = feature.info();
        lines.push(Line::default());
        lines.push(Line::styled(
            feature.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        if let Some(population) = info.population {
            lines.push(Line::from(format!("Population: {population:.0}")));
        }
        if let Some(area_km) = info.area {
            lines.push(Line::from(format!("Area: {area_km:.0} km²")));
        }
        if let Some(density) = info.density {
            lines.push(Line::from(format!("Density: {density:.0}/km²")));
        }
        if let Some(description) = info.description {
            lines.push(Line::from(description));
        }
    }

    let legend = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Legend"))
        .wrap(Wrap { trim: true });
    frame.render_widget(legend, *legend_area);
}

fn detail_line(label: &str, value: impl Into<String>) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(value.into()),
    ])
}

fn draw_details(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(facility) = app.detail_facility() else {
        let paragraph = Paragraph::new("No facility selected.")
            .block(Block::default().borders(Borders::ALL).title("Details"));
        frame.render_widget(paragraph, area);
        return;
    };

    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(7)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [detail_area, nearby_area] = chunks else {
        return;
    };

    let view = FacilityView::from(facility);
    let (red, green, blue) = view.style.rgb();
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} {}", view.style.glyph, view.name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!(" {} ", view.badge),
                Style::default().bg(Color::Rgb(red, green, blue)).fg(Color::Black),
            ),
        ]),
    ];
    if let (Some(stars), Some(rating)) = (view.stars, view.rating_label) {
        lines.push(Line::from(vec![
            Span::styled(stars, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {rating}")),
        ]));
    }
    lines.push(detail_line("District", view.district));
    lines.push(detail_line("Address", view.address));
    lines.push(detail_line("Contact", view.contact));
    if let Some(email) = view.email {
        lines.push(detail_line("Email", email));
    }
    if let Some(hours) = view.opening_hours {
        lines.push(detail_line("Hours", hours));
    }
    if !view.services.is_empty() {
        lines.push(detail_line("Services", view.services.join(", ")));
    }
    lines.push(detail_line(
        "Location",
        format!("{:.4}, {:.4}", facility.coordinates.lat, facility.coordinates.lon),
    ));
    lines.push(detail_line(
        "Likes",
        if view.liked {
            format!("♥ {} (you like this)", view.likes)
        } else {
            format!("♡ {}", view.likes)
        },
    ));

    let details = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(Wrap { trim: true });
    frame.render_widget(details, *detail_area);

    let nearby: Vec<ListItem<'_>> = app
        .service
        .nearest(&facility.coordinates, NEARBY_COUNT)
        .into_iter()
        .map(|hit| {
            ListItem::new(Line::from(vec![
                Span::styled("● ", Style::default().fg(type_color(hit.facility.kind))),
                Span::raw(format!("{} · {:.1} km", hit.facility.name, hit.distance_km)),
            ]))
        })
        .collect();
    let nearby = List::new(nearby).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Nearest facilities"),
    );
    frame.render_widget(nearby, *nearby_area);
}

fn draw_export(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let items: Vec<ListItem<'_>> = ExportFormat::ALL
        .iter()
        .map(|format| {
            ListItem::new(format!(
                "{format:<8} {}  ({})",
                format.file_name(),
                format.mime_type()
            ))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Export {} facilities to {}",
            app.service.facilities().len(),
            app.export_dir.display()
        )))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(app.export_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_upload(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let layout_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let chunks = layout_chunks.as_ref();
    let [input_area, help_area] = chunks else {
        return;
    };

    let input = Paragraph::new(app.upload_input.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("GeoJSON file (Enter)"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(input, *input_area);

    let names = app.service.districts().names();
    let help = Paragraph::new(vec![
        Line::from("Accepts a Feature, FeatureCollection, Polygon, MultiPolygon, or GeometryCollection."),
        Line::from("Features are named from name/NAME/Name, otherwise from the file name."),
        Line::from("Uploading a district that already exists replaces its boundary."),
        Line::default(),
        Line::from(format!("Known districts: {}", names.join(", "))),
    ])
    .block(Block::default().borders(Borders::ALL).title("Add district boundary"))
    .wrap(Wrap { trim: true });
    frame.render_widget(help, *help_area);
}
