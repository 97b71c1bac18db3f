use clap::Parser;
use object_gateway::utils::{logger, validation::Validate};
use object_gateway::{CliArgs, Command, GatewayConfig, JsonObject, ObjectGateway};

fn parse_object(field: &str, raw: &str) -> Result<JsonObject, Box<dyn std::error::Error>> {
    serde_json::from_str(raw).map_err(|e| format!("--{} is not a JSON object: {}", field, e).into())
}

fn parse_pipeline(raw: &str) -> Result<Vec<serde_json::Value>, Box<dyn std::error::Error>> {
    serde_json::from_str(raw).map_err(|e| format!("--pipeline is not a JSON array: {}", e).into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    logger::init_cli_logger(args.verbose);

    tracing::info!("Starting object-gateway CLI");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    let config = GatewayConfig::from_file(&args.config)?;
    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let gateway = ObjectGateway::from_config(&config)?;

    match args.command {
        Command::Save {
            register,
            schema,
            object,
        } => {
            let register = config.register(register)?;
            let schema = config.schema(schema)?;
            let object = parse_object("object", &object)?;

            let record = gateway.save_object(&register, &schema, object).await?;
            tracing::info!("Saved object {} to register {}", record.uuid, record.register);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Find { register, filter } => {
            let register = config.register(register)?;
            let filter = parse_object("filter", &filter)?;

            let documents = gateway.find_objects(&register, &filter).await?;
            tracing::info!("Found {} objects", documents.len());
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        Command::Get { register, filter } => {
            let register = config.register(register)?;
            let filter = parse_object("filter", &filter)?;

            let document = gateway.find_object(&register, &filter).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Update {
            register,
            filter,
            update,
        } => {
            let register = config.register(register)?;
            let filter = parse_object("filter", &filter)?;
            let update = parse_object("update", &update)?;

            let document = gateway.update_object(&register, &filter, &update).await?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Command::Delete { register, filter } => {
            let register = config.register(register)?;
            let filter = parse_object("filter", &filter)?;

            gateway.delete_object(&register, &filter).await?;
            tracing::info!("Delete request completed");
        }
        Command::Aggregate {
            register,
            filter,
            pipeline,
        } => {
            let register = config.register(register)?;
            let filter = parse_object("filter", &filter)?;
            let pipeline = parse_pipeline(&pipeline)?;

            let documents = gateway.aggregate_objects(&register, &filter, &pipeline).await?;
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
    }

    Ok(())
}
