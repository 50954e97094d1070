//! Typed bindings for the PredictionPlatform Gateway contract.
//!
//! The surface mirrors the deployed ABI exactly. Solidity enums
//! (`Outcome`, `EventStatus`) are declared as `uint8` here - that is their
//! ABI encoding - and mapped to domain enums one layer up.

use alloy::sol;

sol! {
    #[sol(rpc)]
    contract PredictionPlatform {
        struct EventData {
            string title;
            string outcomeA;
            string outcomeB;
            uint256 startTime;
            uint256 creatorFeePercent;
            address acceptedToken;
        }

        struct StoredEvent {
            uint256 startTime;
            address creator;
            uint8 creatorFeePercent;
            uint8 status;
            address acceptedToken;
            bytes32 title;
            bytes32 outcomeA;
            bytes32 outcomeB;
        }

        struct StoredPrediction {
            uint256 amount;
            address playerA;
            uint8 outcomeA;
            uint8 outcomeB;
            address playerB;
        }

        function GAME_TIMEOUT() external view returns (uint256);
        function PREDICTION_CUTOFF() external view returns (uint256);
        function owner() external view returns (address);

        function getEventCount() external view returns (uint256);
        function events(uint256 index)
            external
            view
            returns (
                uint256 startTime,
                address creator,
                uint8 creatorFeePercent,
                uint8 status,
                address acceptedToken,
                bytes32 title,
                bytes32 outcomeA,
                bytes32 outcomeB
            );
        function getEventsRange(uint256 start, uint256 end)
            external
            view
            returns (StoredEvent[] memory);
        function predictions(uint256 eventId, uint256 slotIndex)
            external
            view
            returns (
                uint256 amount,
                address playerA,
                uint8 outcomeA,
                uint8 outcomeB,
                address playerB
            );
        function getPredictionsRange(uint256 eventId, uint256 start, uint256 end)
            external
            view
            returns (StoredPrediction[] memory);
        function resolvedEventWinners(uint256 eventId) external view returns (uint8);
        function userPredictions(address user, uint256 eventId, uint256 slotIndex)
            external
            view
            returns (uint256);

        function createEvents(EventData[] calldata _events) external;
        function placePrediction(uint256 _eventId, uint8 _outcome, uint256 _amount)
            external
            payable;
        function matchPrediction(uint256 _eventId, uint256 _predictionIndex)
            external
            payable;
        function resolveEvent(uint256 _eventId, uint8 _winner) external;
        function requestRefund(uint256 _eventId, uint256 _predictionIndex) external;
        function claimWinning(uint256 _eventId, uint256 _predictionIndex) external;
        function cleanupOldEvents(uint256[] calldata _eventIds) external;

        event EventCreated(
            uint256 indexed eventId,
            bytes32 outcomeA,
            bytes32 outcomeB,
            uint256 startTime
        );
        event EventResolved(uint256 indexed eventId, uint8 winner);
        event PredictionPlaced(
            uint256 indexed eventId,
            address indexed predictor,
            uint8 outcome,
            uint256 amount
        );
        event PredictionMatchedAndPlaced(
            uint256 indexed eventId,
            address indexed playerA,
            address indexed playerB,
            uint8 outcome,
            uint256 amount
        );
        event PredictionRefunded(
            uint256 indexed eventId,
            address indexed predictor,
            uint256 amount
        );
        event WinningsClaimed(
            uint256 indexed eventId,
            address indexed winner,
            uint256 amount
        );

        error ReentrancyGuardReentrantCall();
    }
}
