//! The standard structured-output schema.
//!
//! This is the schema the generator ships with: the SO element tree used by
//! pharmacometric tool output, from the SO root down to the diagnostic-plot
//! tables. It doubles as the main fixture for generator tests.

use crate::model::{AttrKind, ChildDef, ChildType, EntityDef, Primitive, Schema};

fn string() -> ChildType {
    ChildType::Primitive(Primitive::Str)
}

fn real() -> ChildType {
    ChildType::Primitive(Primitive::Real)
}

fn int() -> ChildType {
    ChildType::Primitive(Primitive::Int)
}

/// Builds the standard structured-output schema.
#[must_use]
pub fn standard_output_schema() -> Schema {
    let mut schema = Schema::new();

    schema.add_entity(
        EntityDef::new("SO", "SO")
            .fixed_attr("xmlns", "http://www.pharmml.org/so/0.3/StandardisedOutput")
            .fixed_attr("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance")
            .fixed_attr("xmlns:ds", "http://www.pharmml.org/pharmml/0.8/Dataset")
            .fixed_attr("xmlns:ct", "http://www.pharmml.org/pharmml/0.8/CommonTypes")
            .fixed_attr("writtenVersion", "0.3.1")
            .child(ChildDef::new("PharmMLRef", ChildType::reference("PharmMLRef")))
            .child(ChildDef::new("SOBlock", ChildType::reference("SOBlock")).array())
            .field("int error;"),
    );
    schema.add_entity(
        EntityDef::new("PharmMLRef", "SO/PharmMLRef").attr("name", AttrKind::Str),
    );
    schema.add_entity(
        EntityDef::new("SOBlock", "SO/SOBlock")
            .attr("blkId", AttrKind::Str)
            .child(ChildDef::new("ToolSettings", ChildType::reference("ToolSettings")))
            .child(ChildDef::new("RawResults", ChildType::reference("RawResults")))
            .child(ChildDef::new(
                "TaskInformation",
                ChildType::reference("TaskInformation"),
            ))
            .child(ChildDef::new("Estimation", ChildType::reference("Estimation")))
            .child(ChildDef::new("Simulation", ChildType::reference("Simulation")))
            .child(ChildDef::new(
                "ModelDiagnostic",
                ChildType::reference("ModelDiagnostic"),
            ))
            .child(ChildDef::new(
                "OptimalDesign",
                ChildType::reference("OptimalDesign"),
            )),
    );
    schema.add_entity(
        EntityDef::new("ToolSettings", "SO/SOBlock/ToolSettings")
            .child(ChildDef::new("File", ChildType::reference("ExternalFile")).array()),
    );
    schema.add_entity(
        EntityDef::new("RawResults", "SO/SOBlock/RawResults")
            .child(ChildDef::new("DataFile", ChildType::reference("ExternalFile")).array())
            .child(ChildDef::new("GraphicsFile", ChildType::reference("ExternalFile")).array()),
    );
    schema.add_entity(
        EntityDef::new("TaskInformation", "SO/SOBlock/TaskInformation")
            .child(ChildDef::new("Message", ChildType::reference("Message")).array())
            .child(ChildDef::new("OutputFilePath", ChildType::reference("ExternalFile")).array())
            .child(ChildDef::new("RunTime", real()))
            .child(ChildDef::new("NumberChains", ChildType::reference("NumberChains")))
            .child(ChildDef::new(
                "NumberIterations",
                ChildType::reference("NumberIterations"),
            )),
    );
    schema.add_entity(
        EntityDef::new("Message", "SO/SOBlock/TaskInformation/Message")
            .attr("type", AttrKind::Str)
            .child(ChildDef::new("Toolname", ChildType::reference("Toolname")))
            .child(ChildDef::new("Name", ChildType::reference("Name")))
            .child(ChildDef::new("Content", ChildType::reference("Content")))
            .child(ChildDef::new("Severity", ChildType::reference("Severity"))),
    );
    schema.add_entity(
        EntityDef::new("NumberChains", "SO/SOBlock/TaskInformation/NumberChains")
            .child(ChildDef::new("Description", string()).prefix("ct"))
            .child(ChildDef::new("Real", real()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("NumberIterations", "SO/SOBlock/TaskInformation/NumberIterations")
            .child(ChildDef::new("Real", real()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("Toolname", "SO/SOBlock/TaskInformation/Message/Toolname")
            .child(ChildDef::new("String", string()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("Name", "SO/SOBlock/TaskInformation/Message/Name")
            .child(ChildDef::new("String", string()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("Content", "SO/SOBlock/TaskInformation/Message/Content")
            .child(ChildDef::new("String", string()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("Severity", "SO/SOBlock/TaskInformation/Message/Severity")
            .child(ChildDef::new("Int", int()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("Estimation", "SO/SOBlock/Estimation")
            .child(ChildDef::new(
                "PopulationEstimates",
                ChildType::reference("PopulationEstimates"),
            ))
            .child(ChildDef::new(
                "PrecisionPopulationEstimates",
                ChildType::reference("PrecisionPopulationEstimates"),
            ))
            .child(ChildDef::new(
                "IndividualEstimates",
                ChildType::reference("IndividualEstimates"),
            ))
            .child(ChildDef::new("Residuals", ChildType::reference("Residuals")))
            .child(ChildDef::new("Predictions", ChildType::Table))
            .child(ChildDef::new("Likelihood", ChildType::reference("Likelihood"))),
    );
    schema.add_entity(
        EntityDef::new("PopulationEstimates", "SO/SOBlock/Estimation/PopulationEstimates")
            .child(ChildDef::new("MLE", ChildType::Table))
            .child(ChildDef::new("Bayesian", ChildType::reference("Bayesian")))
            .child(ChildDef::new("Bootstrap", ChildType::reference("Bootstrap"))),
    );
    schema.add_entity(
        EntityDef::new(
            "Bootstrap",
            "SO/SOBlock/Estimation/PopulationEstimates/Bootstrap",
        )
        .child(ChildDef::new("Mean", ChildType::Table))
        .child(ChildDef::new("Median", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new(
            "Bayesian",
            "SO/SOBlock/Estimation/PopulationEstimates/Bayesian",
        )
        .child(ChildDef::new("PosteriorMean", ChildType::Table))
        .child(ChildDef::new("PosteriorMedian", ChildType::Table))
        .child(ChildDef::new("PosteriorMode", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new(
            "PrecisionPopulationEstimates",
            "SO/SOBlock/Estimation/PrecisionPopulationEstimates",
        )
        .child(ChildDef::new("MLE", ChildType::reference("MLE")))
        .child(ChildDef::new("Bayesian", ChildType::reference("Bayesian_PPE"))),
    );
    schema.add_entity(
        EntityDef::new(
            "Bayesian_PPE",
            "SO/SOBlock/Estimation/PrecisionPopulationEstimates/Bayesian",
        )
        .element_name("Bayesian")
        .child(ChildDef::new("StandardDeviationPosterior", ChildType::Table))
        .child(ChildDef::new("PercentilesCI", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new("MLE", "SO/SOBlock/Estimation/PrecisionPopulationEstimates/MLE")
            .child(ChildDef::new("FIM", ChildType::Matrix))
            .child(ChildDef::new("CovarianceMatrix", ChildType::Matrix))
            .child(ChildDef::new("CorrelationMatrix", ChildType::Matrix))
            .child(ChildDef::new("StandardError", ChildType::Table))
            .child(ChildDef::new("RelativeStandardError", ChildType::Table))
            .child(ChildDef::new("AsymptoticCI", ChildType::Table))
            .child(ChildDef::new("ConditionNumber", real())),
    );
    schema.add_entity(
        EntityDef::new("IndividualEstimates", "SO/SOBlock/Estimation/IndividualEstimates")
            .child(ChildDef::new("Estimates", ChildType::reference("Estimates")))
            .child(ChildDef::new(
                "RandomEffects",
                ChildType::reference("RandomEffects_IE"),
            ))
            .child(ChildDef::new("EtaShrinkage", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new(
            "Estimates",
            "SO/SOBlock/Estimation/IndividualEstimates/Estimates",
        )
        .child(ChildDef::new("Mean", ChildType::Table))
        .child(ChildDef::new("Median", ChildType::Table))
        .child(ChildDef::new("Mode", ChildType::Table))
        .child(ChildDef::new("Samples", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new(
            "RandomEffects_IE",
            "SO/SOBlock/Estimation/IndividualEstimates/RandomEffects",
        )
        .element_name("RandomEffects")
        .child(ChildDef::new("EffectMean", ChildType::Table))
        .child(ChildDef::new("EffectMedian", ChildType::Table))
        .child(ChildDef::new("EffectMode", ChildType::Table))
        .child(ChildDef::new("Samples", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new("Residuals", "SO/SOBlock/Estimation/Residuals")
            .child(ChildDef::new("ResidualTable", ChildType::Table))
            .child(ChildDef::new("EpsShrinkage", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new("Likelihood", "SO/SOBlock/Estimation/Likelihood")
            .child(ChildDef::new("LogLikelihood", real()))
            .child(ChildDef::new("Deviance", real()))
            .child(ChildDef::new("IndividualContribtoLL", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new("Simulation", "SO/SOBlock/Simulation").child(
            ChildDef::new("SimulationBlock", ChildType::reference("SimulationBlock")).array(),
        ),
    );
    schema.add_entity(
        EntityDef::new("SimulationBlock", "SO/SOBlock/Simulation/SimulationBlock")
            .attr("replicate", AttrKind::Int)
            .child(
                ChildDef::new("SimulatedProfiles", ChildType::reference("SimulationSubType"))
                    .array(),
            )
            .child(
                ChildDef::new("IndivParameters", ChildType::reference("SimulationSubType"))
                    .array(),
            )
            .child(
                ChildDef::new("RandomEffects", ChildType::reference("SimulationSubType")).array(),
            )
            .child(ChildDef::new("Covariates", ChildType::reference("SimulationSubType")).array())
            .child(
                ChildDef::new(
                    "PopulationParameters",
                    ChildType::reference("SimulationSubType"),
                )
                .array(),
            )
            .child(ChildDef::new("Dosing", ChildType::reference("SimulationSubType")).array())
            .child(ChildDef::new(
                "RawResultsFile",
                ChildType::reference("ExternalFile"),
            )),
    );
    schema.add_entity(
        EntityDef::new("SimulationSubType", "SimulationSubType")
            .extends("Table")
            .attr("name", AttrKind::Str)
            .attr("extFileNo", AttrKind::Int),
    );
    schema.add_entity(
        EntityDef::new("ExternalFile", "ExternalFile")
            .named()
            .attr("oid", AttrKind::Str)
            .child(ChildDef::new("path", string()).prefix("ds"))
            .child(ChildDef::new("format", string()).prefix("ds"))
            .child(ChildDef::new("delimiter", string()).prefix("ds"))
            .child(
                ChildDef::new("MissingData", ChildType::reference("MissingData"))
                    .array()
                    .prefix("ds"),
            )
            .child(ChildDef::new("Description", string()).prefix("ct")),
    );
    schema.add_entity(
        EntityDef::new("MissingData", "MissingData")
            .attr("dataCode", AttrKind::Str)
            .attr("missingDataType", AttrKind::Str),
    );
    schema.add_entity(
        EntityDef::new("OptimalDesign", "SO/SOBlock/OptimalDesign")
            .attr("type", AttrKind::Str)
            .child(
                ChildDef::new(
                    "OptimalDesignBlock",
                    ChildType::reference("OptimalDesignBlock"),
                )
                .array(),
            ),
    );
    schema.add_entity(
        EntityDef::new(
            "OptimalDesignBlock",
            "SO/SOBlock/OptimalDesign/OptimalDesignBlock",
        )
        .attr("blockNumber", AttrKind::Int)
        .child(ChildDef::new("FIM", ChildType::Matrix))
        .child(ChildDef::new("CovarianceMatrix", ChildType::Matrix))
        .child(ChildDef::new("ParameterPrecision", ChildType::Table))
        .child(ChildDef::new("Criteria", ChildType::Table))
        .child(ChildDef::new("Tests", ChildType::Table))
        .child(ChildDef::new("SimulatedData", ChildType::reference("ExternalFile")))
        .child(ChildDef::new("Design", ChildType::reference("ExternalFile"))),
    );
    schema.add_entity(
        EntityDef::new("ModelDiagnostic", "SO/SOBlock/ModelDiagnostic")
            .child(ChildDef::new(
                "DiagnosticPlotsStructuralModel",
                ChildType::reference("DiagnosticPlotsStructuralModel"),
            ))
            .child(ChildDef::new("DiagnosticPlotsIndividualParams", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new(
            "DiagnosticPlotsStructuralModel",
            "SO/SOBlock/ModelDiagnostic/DiagnosticPlotsStructuralModel",
        )
        .child(ChildDef::new("IndivFits", ChildType::reference("IndivFits")))
        .child(ChildDef::new("IndivPredictionVsObserv", ChildType::Table))
        .child(ChildDef::new("VPC", ChildType::Table)),
    );
    schema.add_entity(
        EntityDef::new(
            "IndivFits",
            "SO/SOBlock/ModelDiagnostic/DiagnosticPlotsStructuralModel/IndivFits",
        )
        .child(ChildDef::new("ObservationTable", ChildType::Table))
        .child(ChildDef::new("PredictionTable", ChildType::Table)),
    );

    schema
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::SchemaIr;
    use crate::validation::validate_schema;

    #[test]
    fn test_standard_schema_is_valid() {
        let schema = standard_output_schema();
        validate_schema(&schema).expect("standard schema must validate");
    }

    #[test]
    fn test_standard_schema_resolves() {
        let schema = standard_output_schema();
        let ir = SchemaIr::from_schema(&schema).expect("standard schema must resolve");
        assert_eq!(ir.entities.len(), schema.entities.len());
    }

    #[test]
    fn test_message_children_in_schema_order() {
        let schema = standard_output_schema();
        let message = schema.get_entity("Message").unwrap();
        let names: Vec<&str> = message.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Toolname", "Name", "Content", "Severity"]);
    }

    #[test]
    fn test_simulation_sub_type_needs_name() {
        let schema = standard_output_schema();
        let ir = SchemaIr::from_schema(&schema).unwrap();
        assert!(ir.get("SimulationSubType").unwrap().needs_name);
        assert!(ir.get("ExternalFile").unwrap().needs_name);
        assert!(!ir.get("Message").unwrap().needs_name);
    }

    #[test]
    fn test_element_name_overrides() {
        let schema = standard_output_schema();
        let ir = SchemaIr::from_schema(&schema).unwrap();
        assert_eq!(ir.get("Bayesian_PPE").unwrap().xml_tag, "Bayesian");
        assert_eq!(ir.get("RandomEffects_IE").unwrap().xml_tag, "RandomEffects");
    }

    #[test]
    fn test_prefixed_primitive_children() {
        let schema = standard_output_schema();
        let toolname = schema.get_entity("Toolname").unwrap();
        assert_eq!(toolname.children[0].xml_tag(), "ct:String");
        let external = schema.get_entity("ExternalFile").unwrap();
        assert_eq!(external.children[0].xml_tag(), "ds:path");
    }
}
