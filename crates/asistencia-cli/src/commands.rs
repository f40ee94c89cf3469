//! Command handlers. Each returns once its output has been printed.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::warn;

use asistencia_core::models::{Employee, ReportFilter, Schedule};
use asistencia_core::{ApiClient, Config, ExportFormat};

use super::{Command, EmployeeCommand, FilterArgs, ScheduleCommand};

pub async fn run(client: &ApiClient, config: &mut Config, command: Command) -> Result<()> {
    match command {
        Command::Login { username } => login(client, config, username).await,
        Command::Logout => {
            client.session().logout();
            println!("Sesión cerrada");
            Ok(())
        }
        Command::Whoami { check } => whoami(client, check).await,
        Command::Employees(command) => employees(client, command).await,
        Command::Schedules(ScheduleCommand::List { active }) => {
            let schedules = if active {
                client.list_active_schedules().await?
            } else {
                client.list_schedules().await?
            };
            print_schedules(&schedules);
            Ok(())
        }
        Command::Mark { dni } => mark(client, &dni).await,
        Command::Report { filter, page, size } => {
            let filter = ReportFilter {
                page,
                size,
                ..to_filter(&filter)
            };
            let page = client.attendance_report(&filter).await?;
            for record in &page.content {
                println!(
                    "{}  {:<10} {:<30} {:<17} {}",
                    record.marked_at.format("%Y-%m-%d %H:%M"),
                    record.dni,
                    format!("{} {}", record.first_names, record.last_names),
                    record.mark_type.as_str(),
                    record.status.map(|s| format!("{:?}", s)).unwrap_or_default()
                );
            }
            println!(
                "Página {}/{} ({} registros)",
                page.number + 1,
                page.total_pages.max(1),
                page.total_elements
            );
            Ok(())
        }
        Command::Export { filter, format, output } => {
            let format = ExportFormat::from(format);
            let bytes = client.export_report(&to_filter(&filter), format).await?;
            let path = output.unwrap_or_else(|| PathBuf::from(format!("reporte-asistencia.{}", format.extension())));
            std::fs::write(&path, &bytes).with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Reporte guardado en {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }
    }
}

fn to_filter(args: &FilterArgs) -> ReportFilter {
    ReportFilter {
        from: args.from,
        to: args.to,
        employee_id: args.employee,
        mark_type: args.mark_type,
        ..ReportFilter::default()
    }
}

async fn login(client: &ApiClient, config: &mut Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(username) => username,
        None => prompt("Usuario: ")?,
    };
    let password = rpassword::prompt_password(format!("Contraseña para {}: ", username))
        .context("Failed to read password")?;

    if let Err(e) = client.session().login(&username, &password).await {
        bail!(e.user_message());
    }

    config.last_username = Some(username.clone());
    if let Err(e) = config.save() {
        warn!(error = %e, "Could not remember username");
    }
    println!("Sesión iniciada como {}", username);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        bail!("Username is required");
    }
    Ok(value)
}

async fn whoami(client: &ApiClient, check: bool) -> Result<()> {
    let Some(user) = client.session().current_user() else {
        println!("Sin sesión");
        return Ok(());
    };
    println!("{}", user.username);

    if check {
        let validation = client.validate_token().await?;
        if validation.valid {
            println!("Token válido");
        } else {
            println!("Token rechazado: {}", validation.message.unwrap_or_default());
        }
    }
    Ok(())
}

async fn employees(client: &ApiClient, command: EmployeeCommand) -> Result<()> {
    match command {
        EmployeeCommand::List => {
            let employees = client.list_employees().await?;
            for employee in &employees {
                print_employee_row(employee);
            }
            println!("{} empleados", employees.len());
        }
        EmployeeCommand::Show { id } => {
            let employee = client.get_employee(id).await?;
            print_employee_detail(&employee);
        }
        EmployeeCommand::Find { dni } => match client.find_employee_by_dni(&dni).await? {
            Some(employee) => print_employee_detail(&employee),
            None => println!("No existe un empleado con DNI {}", dni),
        },
    }
    Ok(())
}

async fn mark(client: &ApiClient, dni: &str) -> Result<()> {
    // Marking failures are not queued as notifications; show them inline.
    match client.mark_attendance(dni).await {
        Ok(response) => {
            println!("{}", response.message);
            if let Some(employee) = &response.employee {
                println!("  {} {}", employee.first_names, employee.last_names);
            }
            if let Some(mark_type) = response.mark_type {
                println!("  Tipo: {}", mark_type);
            }
            if let Some(at) = response.marked_at {
                println!("  Hora: {}", at.format("%H:%M:%S"));
            }
            Ok(())
        }
        Err(e) => bail!(e.message_or_unknown().to_string()),
    }
}

fn print_employee_row(employee: &Employee) {
    println!(
        "{:>5}  {:<10} {:<35} {:<20} {}",
        employee.id.map(|id| id.to_string()).unwrap_or_default(),
        employee.dni,
        employee.full_name(),
        employee.area,
        if employee.active { "activo" } else { "inactivo" }
    );
}

fn print_employee_detail(employee: &Employee) {
    println!("{}", employee.full_name());
    println!("  DNI:    {}", employee.dni);
    if let Some(code) = &employee.unique_code {
        println!("  Código: {}", code);
    }
    println!("  Cargo:  {}", employee.position);
    println!("  Área:   {}", employee.area);
    println!("  Estado: {}", if employee.active { "activo" } else { "inactivo" });
}

fn print_schedules(schedules: &[Schedule]) {
    for schedule in schedules {
        println!(
            "{:>4}  {:<25} {:<17} {}{}",
            schedule.id.map(|id| id.to_string()).unwrap_or_default(),
            schedule.name,
            schedule.mark_type.as_str(),
            schedule.window_display(),
            if schedule.active == Some(false) { "  (inactivo)" } else { "" }
        );
    }
}
