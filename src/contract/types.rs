use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractType {
    InstanceTemplate,
    InstanceStatus,
    ResourceTemplate,
    ResourceStatus,
    InstanceDemand,
    InstanceProvision,
    ResourceDemand,
    ResourceProvision,
    InterfaceDemand,
    InterfaceProvision,
    EventDemand,
    EventProvision,
    DimensionDemand,
    DimensionProvision,
    FeatureDemand,
    FeatureProvision,
}

impl ContractType {
    pub fn accepts_child(self, child: ContractType) -> bool {
        use ContractType::*;
        match self {
            InstanceTemplate | InstanceStatus => {
                matches!(child, InstanceProvision | InstanceDemand | ResourceDemand)
            }
            ResourceTemplate | ResourceStatus => {
                matches!(child, ResourceProvision | ResourceDemand)
            }
            InstanceDemand | ResourceDemand => matches!(child, InterfaceDemand | EventDemand),
            InstanceProvision | ResourceProvision => {
                matches!(child, InterfaceProvision | EventProvision)
            }
            InterfaceDemand | EventDemand => matches!(child, DimensionDemand),
            InterfaceProvision | EventProvision => matches!(child, DimensionProvision),
            DimensionDemand => matches!(child, FeatureDemand),
            DimensionProvision => matches!(child, FeatureProvision),
            FeatureDemand | FeatureProvision => false,
        }
    }

    pub fn is_demand(self) -> bool {
        use ContractType::*;
        matches!(
            self,
            InstanceDemand | ResourceDemand | InterfaceDemand | EventDemand | DimensionDemand
                | FeatureDemand
        )
    }

    pub fn is_provision(self) -> bool {
        use ContractType::*;
        matches!(
            self,
            InstanceProvision
                | ResourceProvision
                | InterfaceProvision
                | EventProvision
                | DimensionProvision
                | FeatureProvision
        )
    }

    pub fn is_feature(self) -> bool {
        matches!(
            self,
            ContractType::FeatureDemand | ContractType::FeatureProvision
        )
    }

    pub fn provision_counterpart(self) -> Option<ContractType> {
        use ContractType::*;
        match self {
            InstanceDemand => Some(InstanceProvision),
            ResourceDemand => Some(ResourceProvision),
            InterfaceDemand => Some(InterfaceProvision),
            EventDemand => Some(EventProvision),
            DimensionDemand => Some(DimensionProvision),
            FeatureDemand => Some(FeatureProvision),
            _ => None,
        }
    }

    pub fn matches_by_name(self) -> bool {
        use ContractType::*;
        matches!(
            self,
            InterfaceDemand
                | InterfaceProvision
                | EventDemand
                | EventProvision
                | DimensionDemand
                | DimensionProvision
                | FeatureDemand
                | FeatureProvision
        )
    }

    pub fn accepts_feature_attribute(self) -> bool {
        self.is_feature()
    }

    pub fn accepts_cost_estimate(self) -> bool {
        self == ContractType::ResourceTemplate
    }
}
