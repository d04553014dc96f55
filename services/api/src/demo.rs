use std::sync::Arc;

use chrono::NaiveDate;
use clap::Args;
use staykeeper::booking::{
    BookingRequest, BookingService, GuestCount, InMemoryAvailabilityLedger, LifecycleConfig,
    PriceBreakdown, UnitId,
};
use staykeeper::error::AppError;

use crate::infra::{
    default_pricing_policy, seed_units, InMemoryBookingRepository, LoggingEventPublisher,
    SeededUnitCatalog,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Day treated as "today" when the demo completes the stay (YYYY-MM-DD)
    #[arg(long)]
    pub(crate) today: Option<NaiveDate>,
}

fn breakdown_line(price: &PriceBreakdown) -> String {
    match price {
        PriceBreakdown::Nightly {
            nightly_rate,
            extra_per_night,
            total_nights,
            subtotal,
            total,
            ..
        } => format!(
            "{total_nights} nights x ({nightly_rate} + {extra_per_night} extra) = {subtotal}, total {total}"
        ),
        PriceBreakdown::Monthly {
            monthly_rate,
            total,
        } => format!("monthly rate {monthly_rate}, total {total}"),
        PriceBreakdown::Sale { price, total } => format!("sale price {price}, total {total}"),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let events = LoggingEventPublisher::default();
    let ledger = Arc::new(InMemoryAvailabilityLedger::new());
    let service = BookingService::new(
        Arc::new(SeededUnitCatalog::with_units(seed_units())),
        Arc::new(InMemoryBookingRepository::default()),
        ledger,
        Arc::new(events.clone()),
        default_pricing_policy(),
        LifecycleConfig::default(),
    );

    let unit = UnitId("unit-river".to_string());
    let check_in = NaiveDate::from_ymd_opt(2025, 8, 10).expect("valid demo date");
    let check_out = NaiveDate::from_ymd_opt(2025, 8, 13).expect("valid demo date");
    let guests = GuestCount {
        adults: 3,
        children: 1,
    };

    println!("== Staykeeper demo ==");
    for seeded in seed_units() {
        println!("listed {:<12} {} ({})", seeded.id, seeded.name, seeded.kind);
    }

    let preview = service.quote(&unit, check_in, check_out, guests)?;
    println!("\nquote for {unit} {check_in}..{check_out}: {}", breakdown_line(&preview));

    let winner = service.create(BookingRequest {
        unit_id: unit.clone(),
        guest_name: "Amara Osei".to_string(),
        check_in,
        check_out,
        guests,
    })?;
    println!(
        "request {} accepted (dates held: {})",
        winner.record.booking_id, winner.dates_held
    );

    let loser = service.create(BookingRequest {
        unit_id: unit.clone(),
        guest_name: "Jonas Leclerc".to_string(),
        check_in: check_in + chrono::Duration::days(1),
        check_out: check_out + chrono::Duration::days(2),
        guests: GuestCount {
            adults: 2,
            children: 0,
        },
    })?;
    println!(
        "request {} accepted (dates held: {}) - kept for manual resolution",
        loser.record.booking_id, loser.dates_held
    );

    print_calendar(&service, &unit, check_in, check_out + chrono::Duration::days(2))?;

    let approved = service.approve(&winner.record.booking_id, true)?;
    println!(
        "\noperator approved {} (payment {})",
        approved.booking_id,
        approved.payment.label()
    );
    match service.approve(&loser.record.booking_id, false) {
        Ok(_) => println!("unexpected: conflicting request confirmed"),
        Err(err) => println!("operator cannot approve {}: {err}", loser.record.booking_id),
    }

    let today = args.today.unwrap_or_else(|| check_in + chrono::Duration::days(2));
    let completed = service.complete(&winner.record.booking_id, today)?;
    println!(
        "stay {} completed as of {today} ({})",
        completed.booking_id,
        completed.status.label()
    );

    print_calendar(&service, &unit, check_in, check_out + chrono::Duration::days(2))?;

    println!("\nemitted events:");
    for event in events.events() {
        println!("  {event:?}");
    }
    Ok(())
}

fn print_calendar<C, R, L, E>(
    service: &BookingService<C, R, L, E>,
    unit: &UnitId,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<(), AppError>
where
    C: staykeeper::booking::UnitCatalog + 'static,
    R: staykeeper::booking::BookingRepository + 'static,
    L: staykeeper::booking::AvailabilityLedger + 'static,
    E: staykeeper::booking::EventPublisher + 'static,
{
    println!("\ncalendar for {unit}:");
    for day in service.calendar(unit, from, to)? {
        let owner = match (&day.booking_id, &day.guest) {
            (Some(id), Some(guest)) => format!(" {id} ({guest})"),
            (Some(id), None) => format!(" {id}"),
            _ => String::new(),
        };
        println!("  {} {:<9}{owner}", day.date, day.status.label());
    }
    Ok(())
}
